use std::sync::Arc;
use std::time::Duration;

use call_orchestrator::{
    CallConfig, ChannelConfig, DeliveryPolicy, Orchestrator, PresentationSink, TlsConfig,
    TonicTransport,
};
use routeguide::pb::{Point, Rectangle, RouteNote};
use routeguide::RouteGuideClient;

#[derive(Debug)]
struct Opts {
    host: String,
    port: String,
    plaintext: bool,
    ca: Option<String>,
    domain: Option<String>,
    on_completion: bool,
    deadline: Option<Duration>,
    chat_deadline: Option<Duration>,
}

impl Opts {
    fn parse() -> Result<Self, pico_args::Error> {
        let mut pargs = pico_args::Arguments::from_env();
        Ok(Self {
            host: pargs
                .opt_value_from_str("--host")?
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            port: pargs
                .opt_value_from_str("--port")?
                .unwrap_or_else(|| "10000".to_string()),
            plaintext: pargs.contains("--plaintext"),
            ca: pargs.opt_value_from_str("--ca")?,
            domain: pargs.opt_value_from_str("--domain")?,
            on_completion: pargs.contains("--on-completion"),
            deadline: pargs
                .opt_value_from_str("--deadline-ms")?
                .map(Duration::from_millis),
            chat_deadline: pargs
                .opt_value_from_str("--chat-deadline-ms")?
                .map(Duration::from_millis),
        })
    }

    fn channel(&self) -> routeguide::Result<ChannelConfig> {
        let channel = ChannelConfig::new(&self.host, &self.port);
        if self.plaintext {
            return Ok(channel.plaintext());
        }

        let mut tls = TlsConfig::new();
        if let Some(ca) = &self.ca {
            tls = tls.with_ca_certificate(std::fs::read(ca)?);
        }
        if let Some(domain) = &self.domain {
            tls = tls.with_domain_name(domain);
        }
        Ok(channel.with_tls(tls))
    }

    fn calls(&self) -> routeguide::Result<CallConfig> {
        let mut config = CallConfig::default();
        if let Some(deadline) = self.deadline {
            config = config.with_deadline(deadline)?;
        }
        if let Some(deadline) = self.chat_deadline {
            config = config.with_bidirectional_deadline(deadline)?;
        }
        if self.on_completion {
            config = config.with_delivery(DeliveryPolicy::OnCompletion);
        }
        Ok(config)
    }
}

fn point(latitude: i32, longitude: i32) -> Point {
    Point {
        latitude,
        longitude,
    }
}

#[tokio::main]
async fn main() -> routeguide::Result<()> {
    routeguide::trace_init();

    let opts = Opts::parse()?;
    let config = opts.calls()?;
    let delivery = config.delivery;

    let transport = TonicTransport::connect_lazy(&opts.channel()?)?;
    let orchestrator = Arc::new(Orchestrator::new(transport, config));

    let (sink, mut deliveries) = PresentationSink::new();
    let printer = tokio::spawn(async move {
        while let Some(item) = deliveries.recv().await {
            println!("{}", item.text);
        }
    });

    let client = RouteGuideClient::new(orchestrator, sink);

    client.get_feature(point(409146138, -746188906)).await;

    let area = Rectangle {
        lo: Some(point(400000000, -750000000)),
        hi: Some(point(420000000, -730000000)),
    };
    client.list_features(area, delivery).await;

    let route = [
        point(407838351, -746143763),
        point(408122808, -743999179),
        point(409146138, -746188906),
        point(409319800, -746201391),
        point(409642566, -746017679),
        point(410873075, -744459023),
    ];
    client.record_route(route).await;

    let notes = [
        "First message",
        "Second message",
        "Third message",
        "Fourth message",
        "Fifth message",
        "Sixth message",
    ]
    .into_iter()
    .zip(1..)
    .map(|(message, longitude)| RouteNote {
        location: Some(point(0, longitude)),
        message: message.to_string(),
    });
    client.route_chat(notes.collect::<Vec<_>>(), delivery).await;

    client.shutdown().await;
    drop(client);

    if let Err(e) = printer.await {
        tracing::warn!("presentation task failed: {e}");
    }

    Ok(())
}
