use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlButtonElement, HtmlElement, HtmlInputElement, Window,
};

use crate::actions::{self, Dispatch};
use crate::config::{ClientConfig, VIEWPORT_PADDING};
use crate::dom::{create_element, document_is_loaded, get_element, set_status, set_text};
use crate::error::ClientError;
use crate::geometry::ViewportTransform;
use crate::message_log::{summarize, summarize_unknown, LogEntry, LogKind, MessageLog};
use crate::net::websocket_url;
use crate::render::{paint, SurfacePaint};
use crate::scheduler::RenderScheduler;
use crate::speed::SPEED_STEPS_MICROS;
use crate::state::{ConnectionStatus, Repaint, RunPhase, SessionState};
use crate::surfaces::SurfaceSet;
use crate::util::{clock_time, format_number, group_thousands};
use crate::ws::{Connection, WsEvent};

type SharedApp = Rc<RefCell<App>>;

struct Ui {
    status: Element,
    connection: Element,
    best_area: Element,
    checked_count: Element,
    fps: Element,
    start_button: HtmlButtonElement,
    pause_button: HtmlButtonElement,
    resume_button: HtmlButtonElement,
    stop_button: HtmlButtonElement,
    speed_input: HtmlInputElement,
    speed_value: Element,
    cores_input: HtmlInputElement,
    max_cores: Element,
    message_log: HtmlElement,
}

impl Ui {
    fn find(document: &Document) -> Result<Self, ClientError> {
        Ok(Self {
            status: get_element(document, "status")?,
            connection: get_element(document, "connectionStatus")?,
            best_area: get_element(document, "bestArea")?,
            checked_count: get_element(document, "checkedCount")?,
            fps: get_element(document, "fps")?,
            start_button: get_element(document, "startBtn")?,
            pause_button: get_element(document, "pauseBtn")?,
            resume_button: get_element(document, "resumeBtn")?,
            stop_button: get_element(document, "stopBtn")?,
            speed_input: get_element(document, "speedSlider")?,
            speed_value: get_element(document, "speedValue")?,
            cores_input: get_element(document, "coresInput")?,
            max_cores: get_element(document, "maxCores")?,
            message_log: get_element(document, "messageLog")?,
        })
    }
}

struct App {
    window: Window,
    document: Document,
    state: SessionState,
    surfaces: SurfaceSet,
    viewport: ViewportTransform,
    scheduler: RenderScheduler,
    log: MessageLog,
    ui: Ui,
}

impl App {
    fn paint_worker(&self, worker_id: usize) {
        let Some(surface) = self.surfaces.get(worker_id) else {
            return;
        };
        let plan = SurfacePaint::plan(&self.state, worker_id, &self.viewport);
        paint(surface.ctx(), surface.width(), surface.height(), &plan);
    }

    fn paint_all(&self) {
        for (worker_id, _) in self.surfaces.iter() {
            self.paint_worker(worker_id);
        }
    }

    /// Refits the viewport to the first surface; every surface shares its size.
    fn refresh_viewport(&mut self) {
        let (Some(polygon), Some(surface)) = (self.state.polygon.as_ref(), self.surfaces.get(0))
        else {
            return;
        };
        self.viewport = ViewportTransform::fit(
            &polygon.bounding_box,
            surface.width(),
            surface.height(),
            VIEWPORT_PADDING,
        );
        log::debug!("viewport refit {:?}", self.viewport);
    }

    fn rebuild_surfaces(&mut self) {
        if let Err(err) = self.surfaces.rebuild(self.state.requested_cores) {
            log::error!("surface rebuild failed: {err}");
        }
        self.refresh_viewport();
    }

    fn resize(&mut self) {
        self.surfaces.resize();
        self.refresh_viewport();
        self.paint_all();
    }

    fn push_log(&mut self, entry: (String, LogKind)) {
        self.log.push(clock_time(), entry);
        let Some(newest) = self.log.entries().next().cloned() else {
            return;
        };
        if let Err(err) = self.prepend_log_row(&newest) {
            log::warn!("message log row failed: {err}");
        }
    }

    fn prepend_log_row(&self, entry: &LogEntry) -> Result<(), ClientError> {
        let row: HtmlElement = create_element(&self.document, "div")?;
        row.set_class_name(&format!("log-entry {}", entry.kind.css_class()));
        let time: HtmlElement = create_element(&self.document, "span")?;
        time.set_class_name("log-time");
        set_text(&time, &entry.time);
        let content: HtmlElement = create_element(&self.document, "span")?;
        content.set_class_name("log-content");
        set_text(&content, &entry.content);
        row.append_child(&time)?;
        row.append_child(&content)?;

        let list = &self.ui.message_log;
        list.prepend_with_node_1(&row)?;
        while list.child_element_count() as usize > self.log.len() {
            match list.last_element_child() {
                Some(oldest) => oldest.remove(),
                None => break,
            }
        }
        Ok(())
    }

    fn sync_ui(&self) {
        let state = &self.state;
        let ui = &self.ui;
        set_status(&ui.status, state.status_class(), &state.status_message);
        set_status(
            &ui.connection,
            state.connection.css_class(),
            state.connection.label(),
        );
        set_text(&ui.best_area, &format_number(state.best_area));
        set_text(&ui.checked_count, &group_thousands(state.checked_count));

        let connected = state.connection == ConnectionStatus::Connected;
        let busy = state.running || state.phase == RunPhase::Starting;
        ui.start_button.set_disabled(!connected || busy);
        ui.pause_button
            .set_disabled(!connected || !state.running || state.paused);
        ui.resume_button.set_disabled(!connected || !state.paused);
        ui.stop_button.set_disabled(!connected || !busy);

        set_text(&ui.speed_value, &state.speed.label());
        ui.cores_input.set_max(&state.max_cores.to_string());
        ui.cores_input.set_value(&state.requested_cores.to_string());
        set_text(&ui.max_cores, &state.max_cores.to_string());
    }
}

/// Carries out a repaint request. Dirty workers wait for the next animation
/// frame; everything else paints now.
fn apply_repaint(app: &mut App, shared: &SharedApp, repaint: Repaint) {
    match repaint {
        Repaint::Nothing => {}
        Repaint::Workers(worker_ids) => {
            let mut needs_frame = false;
            for worker_id in worker_ids {
                needs_frame |= app.scheduler.mark_dirty(worker_id);
            }
            if needs_frame {
                request_frame(app, shared);
            }
        }
        Repaint::All => app.paint_all(),
        Repaint::Rebuild => {
            app.rebuild_surfaces();
            app.paint_all();
        }
    }
}

fn request_frame(app: &mut App, shared: &SharedApp) {
    let frame_app = shared.clone();
    let callback = Closure::once_into_js(move |now: f64| {
        let mut app = frame_app.borrow_mut();
        for worker_id in app.scheduler.begin_frame(now) {
            app.paint_worker(worker_id);
        }
        let fps = app.scheduler.fps();
        set_text(&app.ui.fps, &fps.to_string());
    });
    match app.window.request_animation_frame(callback.unchecked_ref()) {
        Ok(handle) => {
            log::debug!("frame requested pending={}", app.scheduler.pending().count());
            app.scheduler.frame_requested(handle);
        }
        Err(err) => {
            log::error!("requestAnimationFrame failed: {err:?}");
            app.scheduler.cancel();
        }
    }
}

fn handle_ws_event(shared: &SharedApp, connection: &Weak<Connection>, event: WsEvent) {
    let mut app = shared.borrow_mut();
    match event {
        WsEvent::Open => {
            log::info!("WS open");
            app.state.connected();
        }
        WsEvent::Close { code, reason } => {
            log::warn!("WS closed code={code} reason={reason:?}");
            let delay = app.state.disconnected();
            reconnect_after(&app.state, connection, delay);
        }
        WsEvent::ConnectFailed(reason) => {
            log::warn!("WS connect failed: {reason}");
            let delay = app.state.connect_failed();
            reconnect_after(&app.state, connection, delay);
        }
        WsEvent::Error => {
            log::error!("WS error");
            app.state.connection_error();
        }
        WsEvent::Message(message) => {
            log::debug!("WS message type={}", message.kind());
            app.push_log(summarize(&message));
            let repaint = app.state.apply(message);
            apply_repaint(&mut app, shared, repaint);
        }
        WsEvent::Unknown(kind) => {
            app.push_log(summarize_unknown(&kind));
        }
    }
    app.sync_ui();
}

fn reconnect_after(state: &SessionState, connection: &Weak<Connection>, delay: Option<u32>) {
    let Some(delay) = delay else {
        log::error!("WS reconnect attempts exhausted");
        return;
    };
    log::info!(
        "WS reconnect attempt {}/{} in {delay}ms",
        state.reconnect.attempts(),
        state.reconnect.max_attempts()
    );
    if let Some(connection) = connection.upgrade() {
        connection.schedule_reconnect(delay);
    }
}

fn dispatch(
    shared: &SharedApp,
    connection: &Connection,
    command: impl FnOnce(&mut App) -> Dispatch,
) {
    let mut app = shared.borrow_mut();
    let Dispatch { outbound, repaint } = command(&mut app);
    if let Some(message) = outbound {
        if let Err(err) = connection.send(&message) {
            log::error!("command dropped ({}): {err}", message.kind());
        }
    }
    apply_repaint(&mut app, shared, repaint);
    app.sync_ui();
}

fn on_click(
    button: &HtmlButtonElement,
    shared: &SharedApp,
    connection: &Rc<Connection>,
    command: fn(&mut App) -> Dispatch,
) -> Result<(), JsValue> {
    let shared = shared.clone();
    let connection = connection.clone();
    let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
        dispatch(&shared, &connection, command);
    });
    button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
    onclick.forget();
    Ok(())
}

fn install_controls(shared: &SharedApp, connection: &Rc<Connection>) -> Result<(), JsValue> {
    let (start_button, pause_button, resume_button, stop_button, speed_input, cores_input) = {
        let app = shared.borrow();
        (
            app.ui.start_button.clone(),
            app.ui.pause_button.clone(),
            app.ui.resume_button.clone(),
            app.ui.stop_button.clone(),
            app.ui.speed_input.clone(),
            app.ui.cores_input.clone(),
        )
    };

    on_click(&start_button, shared, connection, |app| {
        let surface_count = app.surfaces.len();
        actions::start(&mut app.state, surface_count)
    })?;
    on_click(&pause_button, shared, connection, |_| actions::pause())?;
    on_click(&resume_button, shared, connection, |_| actions::resume())?;
    on_click(&stop_button, shared, connection, |app| {
        actions::stop(&mut app.state)
    })?;

    {
        let shared = shared.clone();
        let connection = connection.clone();
        let input = speed_input.clone();
        let oninput = Closure::<dyn FnMut(Event)>::new(move |_| {
            let Ok(step) = input.value().parse::<usize>() else {
                return;
            };
            dispatch(&shared, &connection, |app| {
                actions::set_speed(&mut app.state, step)
            });
        });
        speed_input.add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();
    }

    {
        let shared = shared.clone();
        let connection = connection.clone();
        let input = cores_input.clone();
        let onchange = Closure::<dyn FnMut(Event)>::new(move |_| {
            let Ok(num_cores) = input.value().parse::<usize>() else {
                return;
            };
            dispatch(&shared, &connection, |app| {
                actions::set_cores(&mut app.state, num_cores)
            });
        });
        cores_input
            .add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
        onchange.forget();
    }

    Ok(())
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or(ClientError::MissingWindow)?;
    let document = window.document().ok_or(ClientError::MissingDocument)?;
    let started = Rc::new(Cell::new(false));

    if document_is_loaded(&document.ready_state()) {
        started.set(true);
        return start_app();
    }

    let onload_started = started.clone();
    let onload = Closure::<dyn FnMut(Event)>::new(move |_| {
        if onload_started.replace(true) {
            return;
        }
        if let Err(err) = start_app() {
            web_sys::console::error_1(&err);
        }
    });
    window.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
    onload.forget();

    Ok(())
}

fn start_app() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or(ClientError::MissingWindow)?;
    let document = window.document().ok_or(ClientError::MissingDocument)?;

    let config = ClientConfig::from_query(&window.location().search().unwrap_or_default());
    if let Err(err) = console_log::init_with_level(config.log_level()) {
        web_sys::console::warn_1(&format!("logger already set: {err}").into());
    }
    log::info!(
        "rectviz client starting cores={} speed_step={} debug={}",
        config.cores,
        config.speed_step,
        config.debug
    );

    let ui = Ui::find(&document)?;
    ui.speed_input
        .set_max(&(SPEED_STEPS_MICROS.len() - 1).to_string());
    let state = SessionState::new(&config);
    ui.speed_input.set_value(&state.speed.step().to_string());

    let shared: SharedApp = Rc::new(RefCell::new(App {
        window: window.clone(),
        document: document.clone(),
        state,
        surfaces: SurfaceSet::new(document),
        viewport: ViewportTransform::default(),
        scheduler: RenderScheduler::new(),
        log: MessageLog::default(),
        ui,
    }));
    {
        let mut app = shared.borrow_mut();
        app.rebuild_surfaces();
        app.paint_all();
    }

    let connection = Connection::new(window.clone(), websocket_url(&window)?);
    {
        let shared = shared.clone();
        let weak = Rc::downgrade(&connection);
        connection.set_handler(move |event| handle_ws_event(&shared, &weak, event));
    }
    shared.borrow_mut().state.connecting();
    connection.open();

    install_controls(&shared, &connection)?;

    {
        let shared = shared.clone();
        let onresize = Closure::<dyn FnMut()>::new(move || {
            shared.borrow_mut().resize();
        });
        window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref())?;
        onresize.forget();
    }

    {
        let shared = shared.clone();
        let connection = connection.clone();
        let onbeforeunload = Closure::<dyn FnMut(Event)>::new(move |_| {
            let mut app = shared.borrow_mut();
            if let Some(handle) = app.scheduler.cancel() {
                if let Err(err) = app.window.cancel_animation_frame(handle) {
                    log::warn!("cancelAnimationFrame failed: {err:?}");
                }
            }
            connection.shutdown();
        });
        window.add_event_listener_with_callback(
            "beforeunload",
            onbeforeunload.as_ref().unchecked_ref(),
        )?;
        onbeforeunload.forget();
    }

    shared.borrow().sync_ui();
    Ok(())
}
