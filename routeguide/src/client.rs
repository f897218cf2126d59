//! A RouteGuide client that renders every call into a [`ResultSink`].

use std::sync::Arc;

use call_orchestrator::{
    CallConfig, CallOutcome, DeliveryPolicy, Method, Orchestrator, ResultSink, StreamStats,
    Transport,
};

use crate::pb::{Feature, Point, Rectangle, RouteNote, RouteSummary};
use crate::{GetFeature, ListFeatures, RecordRoute, RouteChat};

/// Binds the four RouteGuide methods to an [`Orchestrator`].
///
/// Every method delivers its rendered result to the sink and returns the
/// raw [`CallOutcome`]. Failures are delivered as `"<Method> failed:
/// <reason>"`. Deadlines come from the orchestrator's [`CallConfig`].
#[derive(Debug)]
pub struct RouteGuideClient<T, S> {
    orchestrator: Arc<Orchestrator<T>>,
    sink: S,
    config: CallConfig,
}

impl<T, S> RouteGuideClient<T, S>
where
    T: Transport,
    S: ResultSink,
{
    /// Create a client delivering into `sink`.
    pub fn new(orchestrator: Arc<Orchestrator<T>>, sink: S) -> Self {
        let config = orchestrator.config().clone();
        Self {
            orchestrator,
            sink,
            config,
        }
    }

    /// The orchestrator driving this client's calls.
    pub fn orchestrator(&self) -> &Arc<Orchestrator<T>> {
        &self.orchestrator
    }

    /// Look up the feature at `point`.
    ///
    /// Delivers the feature name, or a notice when nothing is recorded there.
    #[tracing::instrument(skip(self))]
    pub async fn get_feature(&self, point: Point) -> CallOutcome<Feature> {
        let outcome = self
            .orchestrator
            .unary::<GetFeature>(point, self.config.unary_deadline)
            .await;

        match &outcome {
            CallOutcome::Success(feature) if feature.name.is_empty() => {
                let text = format!("no feature found at ({}, {})", point.latitude, point.longitude);
                self.sink.deliver(text, false);
            }
            CallOutcome::Success(feature) => self.sink.deliver(feature.name.clone(), false),
            CallOutcome::Failure(_) => self.report::<GetFeature, _>(&outcome),
        }

        outcome
    }

    /// List the named features within `rect`.
    ///
    /// With [`DeliveryPolicy::AsArrived`] every name is delivered on its own;
    /// with [`DeliveryPolicy::OnCompletion`] the names are delivered as one
    /// newline-separated text once the stream ended.
    #[tracing::instrument(skip(self))]
    pub async fn list_features(
        &self,
        rect: Rectangle,
        delivery: DeliveryPolicy,
    ) -> CallOutcome<StreamStats> {
        let sink = &self.sink;
        let on_items = |features: Vec<Feature>| {
            let names = features
                .into_iter()
                .filter(|feature| !feature.name.is_empty())
                .map(|feature| feature.name);

            match delivery {
                DeliveryPolicy::AsArrived => names.for_each(|name| sink.deliver(name, false)),
                DeliveryPolicy::OnCompletion => {
                    let names = names.collect::<Vec<_>>();
                    if !names.is_empty() {
                        sink.deliver(names.join("\n"), false);
                    }
                }
            }
        };

        let outcome = self
            .orchestrator
            .server_streaming::<ListFeatures, _>(
                rect,
                self.config.server_streaming_deadline,
                delivery,
                on_items,
            )
            .await;

        self.report::<ListFeatures, _>(&outcome);
        outcome
    }

    /// Record a route traversing `points`.
    ///
    /// Delivers the rendered [`RouteSummary`].
    #[tracing::instrument(skip_all)]
    pub async fn record_route<I>(&self, points: I) -> CallOutcome<RouteSummary>
    where
        I: IntoIterator<Item = Point>,
        I::IntoIter: Send,
    {
        let outcome = self
            .orchestrator
            .client_streaming::<RecordRoute, _>(
                tokio_stream::iter(points),
                self.config.client_streaming_deadline,
            )
            .await;

        match &outcome {
            CallOutcome::Success(summary) => self.sink.deliver(render_summary(summary), false),
            CallOutcome::Failure(_) => self.report::<RecordRoute, _>(&outcome),
        }

        outcome
    }

    /// Exchange `notes` with the server.
    ///
    /// Replies are read while notes are still being sent, so every reply is
    /// delivered with `may_cross_thread` set.
    #[tracing::instrument(skip(self, notes))]
    pub async fn route_chat<I>(
        &self,
        notes: I,
        delivery: DeliveryPolicy,
    ) -> CallOutcome<StreamStats>
    where
        I: IntoIterator<Item = RouteNote>,
        I::IntoIter: Send,
    {
        let sink = &self.sink;
        let on_items = |notes: Vec<RouteNote>| match delivery {
            DeliveryPolicy::AsArrived => notes
                .into_iter()
                .for_each(|note| sink.deliver(note.message, true)),
            DeliveryPolicy::OnCompletion => {
                if !notes.is_empty() {
                    let messages = notes
                        .into_iter()
                        .map(|note| note.message)
                        .collect::<Vec<_>>();
                    sink.deliver(messages.join("\n"), true);
                }
            }
        };

        let outcome = self
            .orchestrator
            .bidirectional_streaming::<RouteChat, _, _>(
                tokio_stream::iter(notes),
                self.config.bidirectional_deadline,
                delivery,
                on_items,
            )
            .await;

        self.report::<RouteChat, _>(&outcome);
        outcome
    }

    /// Shut the underlying orchestrator down.
    pub async fn shutdown(&self) {
        self.orchestrator.shutdown().await;
    }

    fn report<M: Method, R>(&self, outcome: &CallOutcome<R>) {
        if let Some(failure) = outcome.as_failure() {
            self.sink
                .deliver(format!("{} failed: {}", M::name(), failure.reason), false);
        }
    }
}

/// Render a route summary for display.
pub fn render_summary(summary: &RouteSummary) -> String {
    format!(
        "traversed {} points, passed {} features, covered {} metres in {} seconds",
        summary.point_count, summary.feature_count, summary.distance, summary.elapsed_time
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_orchestrator::testutil::{Behavior, MockTransport};
    use call_orchestrator::WireMessage;
    use std::sync::Mutex;
    use std::time::Duration;

    type Deliveries = Arc<Mutex<Vec<(String, bool)>>>;

    fn client_with(
        behavior: Behavior,
    ) -> (RouteGuideClient<MockTransport, impl ResultSink>, Deliveries) {
        let deliveries = Deliveries::default();
        let sink = {
            let deliveries = deliveries.clone();
            move |text: String, cross: bool| deliveries.lock().unwrap().push((text, cross))
        };

        let orchestrator = Orchestrator::new(MockTransport::new(behavior), CallConfig::default());
        (RouteGuideClient::new(Arc::new(orchestrator), sink), deliveries)
    }

    fn respond(items: Vec<impl WireMessage>) -> Behavior {
        Behavior::Respond {
            items: items.iter().map(WireMessage::encode_bytes).collect(),
            delay: Duration::ZERO,
        }
    }

    fn feature(name: &str) -> Feature {
        Feature {
            name: name.into(),
            location: None,
        }
    }

    #[tokio::test]
    async fn unnamed_feature_is_reported_as_missing() {
        let (client, deliveries) = client_with(respond(vec![feature("")]));

        let outcome = client
            .get_feature(Point {
                latitude: 1,
                longitude: -2,
            })
            .await;

        assert!(outcome.is_success());
        assert_eq!(
            *deliveries.lock().unwrap(),
            vec![("no feature found at (1, -2)".to_string(), false)]
        );
    }

    #[tokio::test]
    async fn list_features_skips_unnamed_features() {
        let items = vec![feature("a"), feature(""), feature("b")];

        let (client, deliveries) = client_with(respond(items.clone()));
        client
            .list_features(Rectangle::default(), DeliveryPolicy::AsArrived)
            .await;
        assert_eq!(
            *deliveries.lock().unwrap(),
            vec![("a".to_string(), false), ("b".to_string(), false)]
        );

        let (client, deliveries) = client_with(respond(items));
        client
            .list_features(Rectangle::default(), DeliveryPolicy::OnCompletion)
            .await;
        assert_eq!(*deliveries.lock().unwrap(), vec![("a\nb".to_string(), false)]);
    }

    #[tokio::test]
    async fn summary_is_rendered() {
        let summary = RouteSummary {
            point_count: 3,
            feature_count: 1,
            distance: 1200,
            elapsed_time: 0,
        };
        let (client, deliveries) = client_with(respond(vec![summary]));

        let outcome = client.record_route([Point::default(); 3]).await;

        assert_eq!(outcome, CallOutcome::Success(summary));
        assert_eq!(
            deliveries.lock().unwrap()[0].0,
            "traversed 3 points, passed 1 features, covered 1200 metres in 0 seconds"
        );
    }

    #[tokio::test]
    async fn chat_replies_may_cross_threads() {
        let (client, deliveries) = client_with(Behavior::Echo {
            delay: Duration::ZERO,
        });
        let notes = ["hello", "world"].map(|message| RouteNote {
            location: Some(Point::default()),
            message: message.into(),
        });

        let outcome = client.route_chat(notes, DeliveryPolicy::AsArrived).await;

        assert_eq!(
            outcome,
            CallOutcome::Success(StreamStats {
                sent: 2,
                received: 2,
            })
        );
        assert_eq!(
            *deliveries.lock().unwrap(),
            vec![("hello".to_string(), true), ("world".to_string(), true)]
        );
    }

    #[tokio::test]
    async fn failures_carry_the_method_and_reason() {
        let (client, deliveries) = client_with(Behavior::Refuse("connection refused".into()));

        let outcome = client.record_route([Point::default()]).await;

        assert!(!outcome.is_success());
        assert_eq!(
            *deliveries.lock().unwrap(),
            vec![(
                "RecordRoute failed: connection error: connection refused".to_string(),
                false
            )]
        );
    }
}
