//! An in-memory RouteGuide server.

use std::collections::HashMap;
use std::path::Path;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tonic::{Request, Response, Status, Streaming};

use crate::pb::route_guide_server::{RouteGuide, RouteGuideServer};
use crate::pb::{Feature, Point, Rectangle, RouteNote, RouteSummary};

const EARTH_RADIUS_METRES: f64 = 6_371_000.0;
const COORD_FACTOR: f64 = 1e7;

/// Serves RouteGuide requests from a fixed feature list.
///
/// Route notes are shared by every chat on the same service, so a note
/// sent by one client is echoed to whoever later chats at that location.
#[derive(Debug)]
pub struct RouteGuideService {
    features: Arc<[Feature]>,
    notes: Arc<Mutex<HashMap<Point, Vec<RouteNote>>>>,
}

impl RouteGuideService {
    /// Create a service over `features`.
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            features: features.into(),
            notes: Arc::default(),
        }
    }

    /// Create a service over the feature database at `path`.
    pub fn from_db(path: impl AsRef<Path>) -> crate::Result<Self> {
        let features = crate::data::load(path)?;
        tracing::debug!(features = features.len(), "loaded feature database");
        Ok(Self::new(features))
    }

    /// Wrap the service for `tonic::transport::Server::add_service`.
    pub fn into_server(self) -> RouteGuideServer<Self> {
        RouteGuideServer::new(self)
    }

    fn feature_at(&self, point: &Point) -> Option<&Feature> {
        self.features
            .iter()
            .find(|feature| feature.location.as_ref() == Some(point))
    }
}

type ChatStream = Pin<Box<dyn Stream<Item = Result<RouteNote, Status>> + Send + 'static>>;

#[tonic::async_trait]
impl RouteGuide for RouteGuideService {
    async fn get_feature(&self, request: Request<Point>) -> Result<Response<Feature>, Status> {
        let point = request.into_inner();

        let feature = self.feature_at(&point).cloned().unwrap_or(Feature {
            name: String::new(),
            location: Some(point),
        });

        Ok(Response::new(feature))
    }

    type ListFeaturesStream = ReceiverStream<Result<Feature, Status>>;

    async fn list_features(
        &self,
        request: Request<Rectangle>,
    ) -> Result<Response<Self::ListFeaturesStream>, Status> {
        let rect = request.into_inner();
        let (tx, rx) = mpsc::channel(4);
        let features = self.features.clone();

        tokio::spawn(async move {
            for feature in features.iter().filter(|f| contains(&rect, f)) {
                if tx.send(Ok(feature.clone())).await.is_err() {
                    tracing::debug!("list_features receiver dropped");
                    break;
                }
            }
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }

    async fn record_route(
        &self,
        request: Request<Streaming<Point>>,
    ) -> Result<Response<RouteSummary>, Status> {
        let mut stream = request.into_inner();

        let mut summary = RouteSummary::default();
        let mut last_point = None;
        let now = Instant::now();

        while let Some(point) = stream.next().await {
            let point = point?;
            summary.point_count += 1;

            if self.feature_at(&point).is_some_and(|f| !f.name.is_empty()) {
                summary.feature_count += 1;
            }

            if let Some(last_point) = last_point.as_ref() {
                summary.distance += distance(last_point, &point);
            }
            last_point = Some(point);
        }

        summary.elapsed_time = now.elapsed().as_secs() as i32;

        Ok(Response::new(summary))
    }

    type RouteChatStream = ChatStream;

    async fn route_chat(
        &self,
        request: Request<Streaming<RouteNote>>,
    ) -> Result<Response<Self::RouteChatStream>, Status> {
        let mut stream = request.into_inner();
        let notes = self.notes.clone();

        let output = async_stream::try_stream! {
            while let Some(note) = stream.next().await {
                let note = note?;
                let location = note
                    .location
                    .ok_or_else(|| Status::invalid_argument("route note has no location"))?;

                let replies = {
                    let mut notes = notes.lock().unwrap_or_else(|e| e.into_inner());
                    let at_location = notes.entry(location).or_default();
                    at_location.push(note);
                    at_location.clone()
                };

                for reply in replies {
                    yield reply;
                }
            }
        };

        Ok(Response::new(Box::pin(output) as Self::RouteChatStream))
    }
}

fn contains(rect: &Rectangle, feature: &Feature) -> bool {
    let (Some(lo), Some(hi), Some(point)) = (rect.lo, rect.hi, feature.location) else {
        return false;
    };

    let left = lo.longitude.min(hi.longitude);
    let right = lo.longitude.max(hi.longitude);
    let top = lo.latitude.max(hi.latitude);
    let bottom = lo.latitude.min(hi.latitude);

    point.longitude >= left
        && point.longitude <= right
        && point.latitude >= bottom
        && point.latitude <= top
}

/// Great-circle distance between two points, in metres.
fn distance(p1: &Point, p2: &Point) -> i32 {
    let lat1 = p1.latitude as f64 / COORD_FACTOR;
    let lat2 = p2.latitude as f64 / COORD_FACTOR;
    let lng1 = p1.longitude as f64 / COORD_FACTOR;
    let lng2 = p2.longitude as f64 / COORD_FACTOR;

    let lat_rad1 = lat1.to_radians();
    let lat_rad2 = lat2.to_radians();

    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2f64).sin() * (delta_lat / 2f64).sin()
        + (lat_rad1).cos() * (lat_rad2).cos() * (delta_lng / 2f64).sin() * (delta_lng / 2f64).sin();

    let c = 2f64 * a.sqrt().atan2((1f64 - a).sqrt());

    (EARTH_RADIUS_METRES * c) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(latitude: i32, longitude: i32) -> Point {
        Point {
            latitude,
            longitude,
        }
    }

    fn feature(name: &str, latitude: i32, longitude: i32) -> Feature {
        Feature {
            name: name.into(),
            location: Some(point(latitude, longitude)),
        }
    }

    #[test]
    fn distance_between_known_points() {
        assert_eq!(distance(&point(0, 0), &point(0, 0)), 0);

        // One degree of latitude.
        let metres = distance(&point(0, 0), &point(10_000_000, 0));
        assert!((111_190..=111_200).contains(&metres), "{metres}");
    }

    #[test]
    fn rectangle_corners_are_normalized() {
        let inside = feature("inside", 410_000_000, -740_000_000);
        let outside = feature("outside", 430_000_000, -740_000_000);

        let rect = Rectangle {
            lo: Some(point(400_000_000, -750_000_000)),
            hi: Some(point(420_000_000, -730_000_000)),
        };
        let flipped = Rectangle {
            lo: rect.hi,
            hi: rect.lo,
        };

        for rect in [rect, flipped] {
            assert!(contains(&rect, &inside));
            assert!(!contains(&rect, &outside));
        }
        assert!(!contains(&Rectangle::default(), &inside));
    }

    #[tokio::test]
    async fn unknown_points_have_unnamed_features() {
        let service = RouteGuideService::new(vec![feature("known", 1, 2)]);

        let known = service
            .get_feature(Request::new(point(1, 2)))
            .await
            .unwrap();
        assert_eq!(known.into_inner().name, "known");

        let unknown = service
            .get_feature(Request::new(point(3, 4)))
            .await
            .unwrap();
        assert_eq!(
            unknown.into_inner(),
            Feature {
                name: String::new(),
                location: Some(point(3, 4)),
            }
        );
    }

    #[tokio::test]
    async fn list_features_streams_matches_only() {
        let service = RouteGuideService::new(vec![
            feature("a", 10, 10),
            feature("b", 50, 50),
            feature("c", 20, 20),
        ]);
        let rect = Rectangle {
            lo: Some(point(0, 0)),
            hi: Some(point(30, 30)),
        };

        let names = service
            .list_features(Request::new(rect))
            .await
            .unwrap()
            .into_inner()
            .map(|f| f.unwrap().name)
            .collect::<Vec<_>>()
            .await;

        assert_eq!(names, ["a", "c"]);
    }
}
