use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use topicvisor::{
    Config, Context, DispatchError, Dispatcher, Event, ListenerFn, ListenerSet, Propagation,
    ProviderFn,
};

/// Inbound request attached to events as transport metadata.
struct Request {
    path: &'static str,
    user: Option<&'static str>,
}

#[derive(Debug, Default)]
struct Audit {
    steps: Vec<&'static str>,
    status: u16,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("topicvisor=debug")),
        )
        .init();

    let dispatcher = Dispatcher::<Audit>::with_config(
        Config::default().with_timeout(Duration::from_millis(200)),
    );

    let auth = ListenerFn::arc("auth", |_: &Context, ev: &mut Event<Audit>| {
        let user = ev.request::<Request>().and_then(|r| r.user);
        ev.data_mut().steps.push("auth");
        match user {
            Some(_) => Ok(Propagation::Continue),
            None => {
                ev.data_mut().status = 401;
                Ok(Propagation::Stop)
            }
        }
    });

    let handler = ListenerFn::arc("handler", |ctx: &Context, ev: &mut Event<Audit>| {
        let path = ev.request::<Request>().map_or("?", |r| r.path);
        ev.data_mut().steps.push("handler");
        if path == "/slow" {
            std::thread::sleep(Duration::from_millis(300));
        }
        if ctx.is_done() {
            return Err(format!("gave up on {path}").into());
        }
        ev.data_mut().status = 200;
        Ok(Propagation::Continue)
    });

    let access_log = ProviderFn::arc("access-log", |ev: &Event<Audit>| {
        let path = ev.request::<Request>().map_or("?", |r| r.path);
        if path.starts_with("/admin") {
            Vec::new()
        } else {
            vec![ListenerFn::arc("log", |_: &Context, ev: &mut Event<Audit>| {
                ev.data_mut().steps.push("log");
                Ok(Propagation::Continue)
            }) as _]
        }
    });

    dispatcher
        .add_provider("http.request", ListenerSet::<Audit>::new().with(auth).with(handler).arc())
        .add_provider("http.request", access_log);

    let requests = [
        Request { path: "/", user: Some("ada") },
        Request { path: "/admin", user: None },
        Request { path: "/slow", user: Some("grace") },
    ];

    let ctx = Context::background();
    for req in requests {
        let path = req.path;
        let event = Event::new("http.request", Audit::default()).with_request(Arc::new(req));
        let (event, res) = dispatcher.dispatch(&ctx, event);

        match res {
            Ok(()) => println!("{path}: ok {:?}", event.data()),
            Err(e @ DispatchError::Combined { .. }) => {
                println!("{path}: {} ({:?})", e, event.data())
            }
            Err(e) => println!("{path}: {} [{}]", e, e.as_label()),
        }
    }

    dispatcher.reset_all();
    let (_, res) = dispatcher.dispatch(&ctx, Event::new("http.request", Audit::default()));
    println!("after reset: {res:?}");

    Ok(())
}
