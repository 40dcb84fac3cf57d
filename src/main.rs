//! Meteor Dodge entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use meteor_dodge::consts::*;
    use meteor_dodge::renderer::{RenderState, session_vertices};
    use meteor_dodge::settings::Settings;
    use meteor_dodge::sim::{
        Control, KeyEvent, Session, SessionEvent, SessionPhase, TickInput, autopilot, tick,
    };

    /// Game instance holding all state
    struct Game {
        session: Session,
        settings: Settings,
        render_state: Option<RenderState>,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        /// Autopilot plays (toggled with `i`)
        idle_mode: bool,
        hud_dirty: bool,
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Self {
            Self {
                session: Session::new(seed, &settings),
                settings,
                render_state: None,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                idle_mode: false,
                hud_dirty: true,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                // Queued keys and start requests are consumed by the first substep
                let mut input = std::mem::take(&mut self.input);
                if self.idle_mode {
                    if self.session.is_active() {
                        let desired = autopilot::steer(&self.session, &self.settings);
                        input.keys = autopilot::keys_for(self.session.input, desired);
                    } else {
                        input.start = true;
                    }
                }

                let events = tick(&mut self.session, &input, &self.settings);
                for event in &events {
                    self.on_event(event);
                }

                self.accumulator -= SIM_DT;
                substeps += 1;
            }
        }

        fn on_event(&mut self, event: &SessionEvent) {
            match event {
                SessionEvent::Collision { obstacle_index } => {
                    log::debug!("Ship hit meteor #{}", obstacle_index);
                }
                SessionEvent::ObstaclesSpawned { .. } => return,
                _ => {}
            }
            self.hud_dirty = true;
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                let vertices = session_vertices(&self.session, &self.settings);
                match render_state.render(&vertices) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            if !self.hud_dirty {
                return;
            }
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            self.hud_dirty = false;

            if let Some(el) = document.get_element_by_id("score") {
                el.set_text_content(Some(&format!("Score: {}", self.session.score)));
            }

            if let Some(el) = document.get_element_by_id("game-over") {
                let class = if self.session.is_over() { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }

            if let Some(btn) = document.get_element_by_id("start-btn") {
                match self.session.phase {
                    SessionPhase::NotStarted => {
                        btn.set_text_content(Some("Start"));
                        let _ = btn.set_attribute("class", "");
                    }
                    SessionPhase::GameOver => {
                        btn.set_text_content(Some("Restart"));
                        let _ = btn.set_attribute("class", "");
                    }
                    SessionPhase::Active => {
                        let _ = btn.set_attribute("class", "hidden");
                    }
                }
            }
        }

        fn request_start(&mut self) {
            if !self.session.is_active() {
                self.input.start = true;
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Meteor Dodge starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element, nothing to play on");
            return;
        };

        // The measured canvas is the playfield
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let settings = if client_w > 0 && client_h > 0 {
            Settings::load().with_container(client_w as f32, client_h as f32)
        } else {
            Settings::load()
        };
        log::info!(
            "Playfield {}x{}",
            settings.container_width,
            settings.container_height
        );

        let dpr = window.device_pixel_ratio();
        let width = (settings.container_width as f64 * dpr) as u32;
        let height = (settings.container_height as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = settings.seed.unwrap_or(js_sys::Date::now() as u64);
        let playfield = (settings.container_width, settings.container_height);
        let game = Rc::new(RefCell::new(Game::new(seed, settings)));
        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU (falls back to WebGL)
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => {
                let adapter = instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::HighPerformance,
                        compatible_surface: Some(&surface),
                        force_fallback_adapter: false,
                    })
                    .await;
                match adapter {
                    Ok(adapter) => {
                        log::info!("Using adapter: {:?}", adapter.get_info().name);
                        match RenderState::new(surface, &adapter, width, height, playfield).await {
                            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
                            Err(e) => log::error!("Failed to create device: {}", e),
                        }
                    }
                    Err(e) => log::error!("No graphics adapter: {}", e),
                }
            }
            Err(e) => log::error!("Failed to create surface: {}", e),
        }

        setup_input_handlers(game.clone());
        setup_start_button(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Meteor Dodge running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                if let Some(control) = Control::from_key(&key) {
                    event.prevent_default();
                    if !event.repeat() {
                        g.input.keys.push(KeyEvent::Down(control));
                    }
                    return;
                }
                match key.as_str() {
                    " " | "Enter" => {
                        event.prevent_default();
                        g.request_start();
                    }
                    "i" | "I" => {
                        g.idle_mode = !g.idle_mode;
                        log::info!("Idle mode: {}", g.idle_mode);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(control) = Control::from_key(&event.key()) {
                    game.borrow_mut().input.keys.push(KeyEvent::Up(control));
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur: key-ups won't arrive while unfocused, so release everything
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.input.keys.push(KeyEvent::Up(Control::Left));
                g.input.keys.push(KeyEvent::Up(Control::Right));
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_start_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("start-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().request_start();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        } else {
            log::warn!("No #start-btn element; use Enter or Space to start");
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Meteor Dodge (native) starting...");
    log::info!("Native mode runs a headless autopilot demo - run with `trunk serve` to play");

    let settings = match std::env::args().nth(1) {
        Some(path) => meteor_dodge::Settings::load_from_path(std::path::Path::new(&path)),
        None => meteor_dodge::Settings::default(),
    };

    let summary = headless::run_demo(&settings, headless::DEMO_SECONDS);
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to encode summary: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use serde::Serialize;

    use meteor_dodge::Settings;
    use meteor_dodge::consts::TICK_HZ;
    use meteor_dodge::sim::{Session, SessionEvent, TickInput, autopilot, tick};

    /// Longest demo run before giving up on a collision
    pub const DEMO_SECONDS: u64 = 120;

    #[derive(Debug, Serialize)]
    pub struct DemoSummary {
        pub seed: u64,
        pub ticks: u64,
        pub score: u64,
        pub batch_size: u32,
        pub meteors_on_screen: usize,
        pub game_over: bool,
    }

    /// Play one session with the autopilot at simulation speed
    pub fn run_demo(settings: &Settings, seconds: u64) -> DemoSummary {
        let seed = settings.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });
        log::info!("Demo seed: {}", seed);

        let mut session = Session::new(seed, settings);
        let mut input = TickInput {
            start: true,
            ..Default::default()
        };

        for _ in 0..seconds * TICK_HZ as u64 {
            for event in tick(&mut session, &input, settings) {
                match event {
                    SessionEvent::ScoreChanged { score } => log::debug!("Score {}", score),
                    SessionEvent::GameOver { score } => log::info!("Demo ended at score {}", score),
                    other => log::debug!("{:?}", other),
                }
            }
            if session.is_over() {
                break;
            }
            let desired = autopilot::steer(&session, settings);
            input = TickInput {
                start: false,
                keys: autopilot::keys_for(session.input, desired),
            };
        }

        DemoSummary {
            seed,
            ticks: session.time_ticks,
            score: session.score,
            batch_size: session.batch_size,
            meteors_on_screen: session.obstacles.len(),
            game_over: session.is_over(),
        }
    }

}
