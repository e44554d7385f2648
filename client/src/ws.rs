//! The single websocket session to the search server, with capped
//! exponential reconnect.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket, Window};

use rectviz_shared::{
    decode_server_message, encode_client_message, ClientMessage, DecodeError, ServerMessage,
};

use crate::config::{MAX_RECONNECT_ATTEMPTS, RECONNECT_BASE_MS, RECONNECT_CAP_MS};
use crate::error::ClientError;

#[derive(Debug)]
pub enum WsEvent {
    Open,
    Close { code: u16, reason: String },
    Error,
    /// The socket could not even be created; counts as a failed attempt.
    ConnectFailed(String),
    Message(ServerMessage),
    /// A well-formed frame whose `type` this client does not handle.
    Unknown(String),
}

/// Reconnect schedule: `base * 2^(attempt-1)` capped at `cap`, for at most
/// `max_attempts` consecutive failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backoff {
    attempts: u32,
    max_attempts: u32,
    base_ms: u32,
    cap_ms: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(MAX_RECONNECT_ATTEMPTS, RECONNECT_BASE_MS, RECONNECT_CAP_MS)
    }
}

impl Backoff {
    pub fn new(max_attempts: u32, base_ms: u32, cap_ms: u32) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            base_ms,
            cap_ms,
        }
    }

    /// Counts one more failed attempt and returns how long to wait before
    /// the next one, or `None` when the ceiling has been reached.
    pub fn next_delay(&mut self) -> Option<u32> {
        if self.exhausted() {
            return None;
        }
        self.attempts += 1;
        let factor = 2u32.saturating_pow(self.attempts - 1);
        Some(self.base_ms.saturating_mul(factor).min(self.cap_ms))
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}

type EventHandler = Rc<RefCell<dyn FnMut(WsEvent)>>;

struct SocketHandlers {
    _onopen: Closure<dyn FnMut(Event)>,
    _onclose: Closure<dyn FnMut(CloseEvent)>,
    _onerror: Closure<dyn FnMut(Event)>,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
}

pub struct Connection {
    window: Window,
    url: String,
    socket: RefCell<Option<WebSocket>>,
    handlers: RefCell<Option<SocketHandlers>>,
    on_event: RefCell<Option<EventHandler>>,
    reconnect_timer: Cell<Option<i32>>,
    shut_down: Cell<bool>,
}

impl Connection {
    pub fn new(window: Window, url: String) -> Rc<Self> {
        Rc::new(Self {
            window,
            url,
            socket: RefCell::new(None),
            handlers: RefCell::new(None),
            on_event: RefCell::new(None),
            reconnect_timer: Cell::new(None),
            shut_down: Cell::new(false),
        })
    }

    pub fn set_handler(&self, handler: impl FnMut(WsEvent) + 'static) {
        let handler: EventHandler = Rc::new(RefCell::new(handler));
        *self.on_event.borrow_mut() = Some(handler);
    }

    /// Opens a fresh socket. A failure is reported to the handler as
    /// [`WsEvent::ConnectFailed`] instead of being returned.
    pub fn open(&self) {
        if let Err(error) = self.connect() {
            log::error!("WS could not be created url={}: {error:?}", self.url);
            self.emit(WsEvent::ConnectFailed(format!("{error:?}")));
        }
    }

    fn connect(&self) -> Result<(), JsValue> {
        if self.shut_down.get() {
            return Ok(());
        }
        if let Some(previous) = self.detach() {
            let _ = previous.close();
        }
        let Some(on_event) = self.on_event.borrow().clone() else {
            return Err(JsValue::from_str("websocket handler not set"));
        };
        log::info!("WS connecting url={}", self.url);
        let socket = WebSocket::new(&self.url)?;
        let handlers = attach_handlers(&socket, on_event);
        *self.socket.borrow_mut() = Some(socket);
        *self.handlers.borrow_mut() = Some(handlers);
        Ok(())
    }

    /// Sends `message` if the socket is open. Nothing is queued: a message
    /// sent while disconnected is dropped with [`ClientError::NotOpen`].
    pub fn send(&self, message: &ClientMessage) -> Result<(), ClientError> {
        let socket = self.socket.borrow();
        let socket = socket
            .as_ref()
            .filter(|socket| socket.ready_state() == WebSocket::OPEN)
            .ok_or(ClientError::NotOpen)?;
        let payload = encode_client_message(message)?;
        log::debug!("WS sending {payload}");
        socket.send_with_str(&payload)?;
        Ok(())
    }

    pub fn schedule_reconnect(self: &Rc<Self>, delay_ms: u32) {
        if self.shut_down.get() {
            return;
        }
        if let Some(handle) = self.reconnect_timer.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        let connection = Rc::clone(self);
        let callback = Closure::once_into_js(move || {
            connection.reconnect_timer.set(None);
            connection.open();
        });
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                i32::try_from(delay_ms).unwrap_or(i32::MAX),
            ) {
            Ok(handle) => self.reconnect_timer.set(Some(handle)),
            Err(error) => log::error!("WS could not schedule reconnect: {error:?}"),
        }
    }

    /// Cancels any pending reconnect, detaches the handlers so nothing fires
    /// afterwards and closes the socket.
    pub fn shutdown(&self) {
        self.shut_down.set(true);
        if let Some(handle) = self.reconnect_timer.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        if let Some(socket) = self.detach() {
            let _ = socket.close();
        }
        log::info!("WS shut down url={}", self.url);
    }

    fn emit(&self, event: WsEvent) {
        let handler = self.on_event.borrow().clone();
        if let Some(handler) = handler {
            handler.borrow_mut()(event);
        }
    }

    fn detach(&self) -> Option<WebSocket> {
        let socket = self.socket.borrow_mut().take();
        if let Some(socket) = &socket {
            socket.set_onopen(None);
            socket.set_onclose(None);
            socket.set_onerror(None);
            socket.set_onmessage(None);
        }
        self.handlers.borrow_mut().take();
        socket
    }
}

fn attach_handlers(socket: &WebSocket, on_event: EventHandler) -> SocketHandlers {
    let open_reported = Rc::new(Cell::new(false));

    let onopen = {
        let on_event = on_event.clone();
        let open_reported = open_reported.clone();
        Closure::<dyn FnMut(Event)>::new(move |_| {
            open_reported.set(true);
            on_event.borrow_mut()(WsEvent::Open);
        })
    };
    socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));

    let onclose = {
        let on_event = on_event.clone();
        let open_reported = open_reported.clone();
        Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
            open_reported.set(false);
            on_event.borrow_mut()(WsEvent::Close {
                code: event.code(),
                reason: event.reason(),
            });
        })
    };
    socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));

    let onerror = {
        let on_event = on_event.clone();
        Closure::<dyn FnMut(Event)>::new(move |_| {
            on_event.borrow_mut()(WsEvent::Error);
        })
    };
    socket.set_onerror(Some(onerror.as_ref().unchecked_ref()));

    let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        if !open_reported.replace(true) {
            log::warn!("WS message arrived before onopen");
            on_event.borrow_mut()(WsEvent::Open);
        }
        let Some(text) = event.data().as_string() else {
            log::error!("WS message data is not text; frame dropped");
            return;
        };
        match decode_server_message(&text) {
            Ok(message) => on_event.borrow_mut()(WsEvent::Message(message)),
            Err(DecodeError::UnknownType(kind)) => {
                log::warn!("WS unknown message type: {kind}");
                on_event.borrow_mut()(WsEvent::Unknown(kind));
            }
            Err(error) => {
                log::error!(
                    "WS message parse error: {error} payload={:?}",
                    snippet(&text)
                );
            }
        }
    });
    socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

    SocketHandlers {
        _onopen: onopen,
        _onclose: onclose,
        _onerror: onerror,
        _onmessage: onmessage,
    }
}

/// First 200 characters of a payload, for log lines.
pub fn snippet(text: &str) -> String {
    const LIMIT: usize = 200;
    if text.chars().count() <= LIMIT {
        text.to_string()
    } else {
        let head: String = text.chars().take(LIMIT).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod ws_test;
