//! Browser transport for the flag service (WASM only)
//!
//! Evaluations come from a CORS `GET` on the evalx endpoint; changes from
//! an `EventSource` on the client stream endpoint.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, EventSource, MessageEvent, RequestInit, RequestMode, Response};

use super::context::UserContext;
use super::snapshot::FlagValues;
use super::source::FlagSource;
use super::wire::{self, FlagUpdate};
use crate::config::FlagServiceConfig;
use crate::error::FlagSourceError;
use crate::queue::EventQueue;

const STREAM_EVENTS: [&str; 4] = ["put", "patch", "delete", "ping"];

fn js_error(e: JsValue) -> FlagSourceError {
    FlagSourceError::Network(format!("{:?}", e))
}

/// Open event stream; closed on drop
struct Stream {
    source: EventSource,
    _listeners: Vec<Closure<dyn FnMut(MessageEvent)>>,
}

impl Drop for Stream {
    fn drop(&mut self) {
        self.source.close();
    }
}

pub struct RemoteFlagSource {
    config: FlagServiceConfig,
    configured: bool,
    stream: RefCell<Option<Stream>>,
}

impl RemoteFlagSource {
    pub fn new(config: FlagServiceConfig) -> Self {
        let configured = config.validate();
        Self {
            config,
            configured,
            stream: RefCell::new(None),
        }
    }

    fn client_id(&self) -> Result<&str, FlagSourceError> {
        if self.configured {
            Ok(self.config.client_side_id.trim())
        } else {
            Err(FlagSourceError::Unavailable(
                "client-side id not configured".to_string(),
            ))
        }
    }

    fn evaluation_url(&self, ctx: &UserContext) -> Result<String, FlagSourceError> {
        Ok(format!(
            "{}/sdk/evalx/{}/contexts/{}",
            self.config.base_url.trim_end_matches('/'),
            self.client_id()?,
            ctx.encoded()
        ))
    }

    fn stream_url(&self, ctx: &UserContext) -> Result<String, FlagSourceError> {
        Ok(format!(
            "{}/eval/{}/{}",
            self.config.stream_url.trim_end_matches('/'),
            self.client_id()?,
            ctx.encoded()
        ))
    }
}

impl FlagSource for RemoteFlagSource {
    async fn fetch(&self, ctx: &UserContext, timeout_ms: u32) -> Result<FlagValues, FlagSourceError> {
        let url = self.evaluation_url(ctx)?;
        let window = web_sys::window()
            .ok_or_else(|| FlagSourceError::Unavailable("no window".to_string()))?;

        let controller = AbortController::new().map_err(js_error)?;
        let init = RequestInit::new();
        init.set_method("GET");
        init.set_mode(RequestMode::Cors);
        init.set_signal(Some(&controller.signal()));

        let timed_out = Rc::new(Cell::new(false));
        // Dropping the timeout cancels it
        let _deadline = {
            let timed_out = timed_out.clone();
            Timeout::new(timeout_ms, move || {
                timed_out.set(true);
                controller.abort();
            })
        };
        let classify = |e: JsValue| {
            if timed_out.get() {
                FlagSourceError::Timeout(timeout_ms)
            } else {
                js_error(e)
            }
        };

        let resp: Response = JsFuture::from(window.fetch_with_str_and_init(&url, &init))
            .await
            .map_err(classify)?
            .unchecked_into();
        if !resp.ok() {
            return Err(FlagSourceError::Http(resp.status()));
        }

        let body = JsFuture::from(resp.text().map_err(js_error)?)
            .await
            .map_err(classify)?
            .as_string()
            .ok_or_else(|| FlagSourceError::Network("response body is not text".to_string()))?;
        wire::parse_evaluations(&body)
    }

    fn stream(
        &self,
        ctx: &UserContext,
        updates: Rc<EventQueue<FlagUpdate>>,
    ) -> Result<(), FlagSourceError> {
        let url = self.stream_url(ctx)?;
        // Close the previous context's stream before opening a new one
        self.stream.borrow_mut().take();

        let source = EventSource::new(&url).map_err(js_error)?;
        let mut listeners = Vec::with_capacity(STREAM_EVENTS.len());
        for event in STREAM_EVENTS {
            let updates = updates.clone();
            let listener = Closure::<dyn FnMut(MessageEvent)>::new(move |msg: MessageEvent| {
                let data = msg.data().as_string().unwrap_or_default();
                match wire::parse_event(event, &data) {
                    Ok(Some(update)) => updates.push(update),
                    Ok(None) => {}
                    Err(e) => log::warn!("Bad {} event from flag stream: {}", event, e),
                }
            });
            source
                .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
                .map_err(js_error)?;
            listeners.push(listener);
        }

        log::info!("Flag stream opened");
        *self.stream.borrow_mut() = Some(Stream {
            source,
            _listeners: listeners,
        });
        Ok(())
    }
}
