//! Chroma Drop entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, PointerEvent};

    use chroma_drop::consts::*;
    use chroma_drop::highscores::HighScores;
    use chroma_drop::persistence::{KeyValueStore, open_default};
    use chroma_drop::platform::web::WebFeedback;
    use chroma_drop::platform::{Feedback, SoundEffect, dispatch};
    use chroma_drop::renderer::{RenderState, Viewport, scene};
    use chroma_drop::settings::Settings;
    use chroma_drop::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
    use chroma_drop::tuning::Tuning;

    /// Max pointer travel (CSS px) for a press to still count as a tap
    const TAP_SLOP: f32 = 12.0;
    /// Max press length (ms) for a tap
    const TAP_MAX_MS: f64 = 350.0;
    /// Arrow key step (world units)
    const KEY_NUDGE: f32 = 36.0;

    /// An in-progress pointer press
    struct PointerPress {
        start: (f32, f32),
        time: f64,
        /// Player x when the press began; drags are relative to it
        player_x: f32,
        /// World x under the pointer when the press began
        world_x: f32,
        moved: bool,
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        tuning: Tuning,
        settings: Settings,
        high_scores: HighScores,
        store: Option<Box<dyn KeyValueStore>>,
        feedback: WebFeedback,
        render_state: Option<RenderState>,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        /// Canvas size in CSS pixels (pointer coordinate space)
        css_size: (f32, f32),
        press: Option<PointerPress>,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        /// Leaderboard rank of the last finished run
        last_rank: Option<usize>,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let store = match open_default() {
                Ok(store) => Some(store),
                Err(e) => {
                    log::warn!("Storage unavailable, progress will not be saved: {}", e);
                    None
                }
            };
            let (settings, high_scores) = match &store {
                Some(store) => (Settings::load(store.as_ref()), HighScores::load(store.as_ref())),
                None => (Settings::default(), HighScores::new()),
            };

            Self {
                state: GameState::new(seed),
                tuning: Tuning::default(),
                settings,
                high_scores,
                store,
                feedback: WebFeedback::new(),
                render_state: None,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                css_size: (WORLD_WIDTH, WORLD_HEIGHT),
                press: None,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                last_rank: None,
            }
        }

        fn viewport(&self) -> Viewport {
            Viewport::new(self.css_size.0, self.css_size.1)
        }

        /// A tap means something different on every screen
        fn tap(&mut self) {
            match self.state.phase {
                GamePhase::Ready => self.input.start = true,
                GamePhase::Playing => self.input.cycle_color = true,
                GamePhase::Paused => self.input.pause = true,
                GamePhase::LevelComplete => self.input.advance = true,
                GamePhase::GameOver => self.restart(),
            }
        }

        fn restart(&mut self) {
            self.input.restart = true;
            self.last_rank = None;
        }

        fn toggle_pause(&mut self) {
            if matches!(self.state.phase, GamePhase::Playing | GamePhase::Paused) {
                self.input.pause = true;
            }
        }

        fn toggle_sound(&mut self) {
            self.settings.sound = !self.settings.sound;
            log::info!("Sound {}", if self.settings.sound { "on" } else { "off" });
            if let Some(store) = self.store.as_mut() {
                if let Err(e) = self.settings.save(store.as_mut()) {
                    log::warn!("Failed to save settings: {}", e);
                }
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &self.tuning, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.drag_x = None;
                self.input.cycle_color = false;
                self.input.start = false;
                self.input.pause = false;
                self.input.advance = false;
                self.input.restart = false;
            }

            let events = self.state.drain_events();
            dispatch(&events, &self.settings, &mut self.feedback);
            for event in &events {
                if let GameEvent::GameOver { score, level } = *event {
                    self.record_score(score, level);
                }
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            // Calculate FPS from oldest to newest frame
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        fn record_score(&mut self, score: u64, level: u32) {
            self.last_rank = self
                .high_scores
                .add_score(score, level, js_sys::Date::now());
            let Some(rank) = self.last_rank else { return };

            log::info!("New high score #{}: {} (level {})", rank, score, level);
            let volume = self.settings.effective_volume();
            if volume > 0.0 {
                self.feedback.play(SoundEffect::HighScore, volume);
            }
            if let Some(store) = self.store.as_mut() {
                if let Err(e) = self.high_scores.save(store.as_mut()) {
                    log::warn!("Failed to save high scores: {}", e);
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let vertices = scene(&self.state, &self.settings);
            if let Some(ref mut render_state) = self.render_state {
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
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let phase = self.state.phase;

            set_text(&document, "#hud-score .hud-value", &self.state.score.to_string());
            set_text(&document, "#hud-level .hud-value", &self.state.level.to_string());
            let best = self.high_scores.top_score().max(self.state.score);
            set_text(&document, "#hud-best .hud-value", &best.to_string());

            set_visible(&document, "hud-fps", self.settings.show_fps);
            if self.settings.show_fps {
                set_text(&document, "#hud-fps .hud-value", &self.fps.to_string());
            }
            set_text(
                &document,
                "#sound-btn",
                if self.settings.sound { "Sound: On" } else { "Sound: Off" },
            );

            set_visible(&document, "ready-prompt", phase == GamePhase::Ready);
            set_visible(&document, "pause-menu", phase == GamePhase::Paused);

            set_visible(&document, "level-complete", phase == GamePhase::LevelComplete);
            if phase == GamePhase::LevelComplete {
                set_text(&document, "#cleared-level", &self.state.level.to_string());
            }

            set_visible(&document, "game-over", phase == GamePhase::GameOver);
            if phase == GamePhase::GameOver {
                set_text(&document, "#final-score", &self.state.score.to_string());
                set_text(&document, "#final-level", &self.state.level.to_string());
                set_visible(&document, "new-best", self.last_rank.is_some());
                if let Some(rank) = self.last_rank {
                    set_text(&document, "#new-best-rank", &rank.to_string());
                }
            }
        }
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", !visible);
        }
    }

    /// Size the canvas backing store to its CSS size times the device pixel ratio
    ///
    /// Returns (css width, css height, pixel width, pixel height).
    fn fit_canvas(canvas: &HtmlCanvasElement) -> (f32, f32, u32, u32) {
        let dpr = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0);
        let client_w = canvas.client_width().max(1);
        let client_h = canvas.client_height().max(1);
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        (client_w as f32, client_h as f32, width, height)
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Chroma Drop starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Hide loading indicator
        set_visible(&document, "loading", false);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()
            .map_err(|_| "element #canvas is not a canvas")?;

        let (css_w, css_h, width, height) = fit_canvas(&canvas);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        game.borrow_mut().css_size = (css_w, css_h);

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU, falling back to WebGL2 where navigator.gpu is missing
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_resize(canvas, game.clone());
        setup_auto_pause(game.clone());

        set_visible(&document, "hud", true);

        // Start game loop
        request_animation_frame(game);

        log::info!("Chroma Drop running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Press: remember where it started, drags are relative to it
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let _ = canvas_clone.set_pointer_capture(event.pointer_id());
                let mut g = game.borrow_mut();
                // Browsers only allow audio after a user gesture
                g.feedback.resume();
                let start = (event.offset_x() as f32, event.offset_y() as f32);
                let (world_x, _) = g.viewport().screen_to_world(start.0, start.1);
                let player_x = g.state.player.x;
                g.press = Some(PointerPress {
                    start,
                    time: js_sys::Date::now(),
                    player_x,
                    world_x,
                    moved: false,
                });
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Drag
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut guard = game.borrow_mut();
                let g = &mut *guard;
                let viewport = g.viewport();
                let Some(press) = g.press.as_mut() else { return };

                let (x, y) = (event.offset_x() as f32, event.offset_y() as f32);
                let dx = x - press.start.0;
                let dy = y - press.start.1;
                if !press.moved && dx.hypot(dy) > TAP_SLOP {
                    press.moved = true;
                }
                if press.moved {
                    let (world_x, _) = viewport.screen_to_world(x, y);
                    g.input.drag_x = Some(press.player_x + world_x - press.world_x);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Release: short, still presses are taps
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                let mut g = game.borrow_mut();
                let Some(press) = g.press.take() else { return };
                if !press.moved && js_sys::Date::now() - press.time <= TAP_MAX_MS {
                    g.tap();
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                game.borrow_mut().press = None;
            });
            let _ = canvas
                .add_event_listener_with_callback("pointercancel", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let Some(window) = web_sys::window() else { return };
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    " " | "Enter" => g.tap(),
                    "Escape" | "p" | "P" => g.toggle_pause(),
                    "ArrowLeft" | "a" | "A" => {
                        let x = g.state.player.x - KEY_NUDGE;
                        g.input.drag_x = Some(x);
                    }
                    "ArrowRight" | "d" | "D" => {
                        let x = g.state.player.x + KEY_NUDGE;
                        g.input.drag_x = Some(x);
                    }
                    "m" | "M" => g.toggle_sound(),
                    "i" | "I" => {
                        g.input.autopilot = !g.input.autopilot;
                        log::info!("Autopilot: {}", g.input.autopilot);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
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

            g.update(dt, time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| handler());
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        {
            let game = game.clone();
            on_click(&document, "restart-btn", move || {
                game.borrow_mut().restart();
                log::info!("Restart requested");
            });
        }
        {
            let game = game.clone();
            on_click(&document, "resume-btn", move || game.borrow_mut().toggle_pause());
        }
        on_click(&document, "sound-btn", move || game.borrow_mut().toggle_sound());
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (css_w, css_h, width, height) = fit_canvas(&canvas);
            let mut g = game.borrow_mut();
            g.css_size = (css_w, css_h);
            if let Some(render_state) = g.render_state.as_mut() {
                render_state.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        // Visibility change (tab switch, app switch on mobile)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.state.is_active() {
                        g.input.pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.state.is_active() {
                    g.input.pause = true;
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Failed to start: {:?}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use chroma_drop::HighScores;
    use chroma_drop::consts::SIM_DT;
    use chroma_drop::persistence::{KeyValueStore, MemoryStore, open_default};
    use chroma_drop::platform::{Feedback, Haptic, SoundEffect, dispatch};
    use chroma_drop::settings::Settings;
    use chroma_drop::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
    use chroma_drop::tuning::Tuning;

    /// Ten minutes of simulated play
    const DEFAULT_MAX_TICKS: u64 = 60 * 60 * 10;

    /// Feedback sink that logs what a device would play
    struct LogFeedback;

    impl Feedback for LogFeedback {
        fn play(&mut self, effect: SoundEffect, volume: f32) {
            log::debug!("sound {:?} @ {:.2}", effect, volume);
        }

        fn vibrate(&mut self, haptic: Haptic) {
            log::debug!("vibrate {:?} ({} ms)", haptic, haptic.duration_ms());
        }
    }

    /// Result of one autopilot run
    pub struct RunSummary {
        pub seed: u64,
        pub ticks: u64,
        pub score: u64,
        pub level: u32,
        pub game_over: bool,
    }

    /// Play one run on autopilot until game over or `max_ticks`
    pub fn autopilot_run(seed: u64, tuning: &Tuning, max_ticks: u64) -> RunSummary {
        let settings = Settings::default();
        let mut feedback = LogFeedback;
        let mut state = GameState::new(seed);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        while state.time_ticks < max_ticks && state.phase != GamePhase::GameOver {
            tick(&mut state, tuning, &input, SIM_DT);
            let events = state.drain_events();
            dispatch(&events, &settings, &mut feedback);
            for event in &events {
                match event {
                    GameEvent::LevelComplete { level } => log::info!("Cleared level {}", level),
                    GameEvent::Mismatch { player, block } => log::info!(
                        "Mismatch: {} disc hit by {} block",
                        player.as_str(),
                        block.as_str()
                    ),
                    _ => {}
                }
            }
        }

        RunSummary {
            seed,
            ticks: state.time_ticks,
            score: state.score,
            level: state.level,
            game_over: state.phase == GamePhase::GameOver,
        }
    }

    fn load_tuning(path: Option<&str>) -> Tuning {
        let Some(path) = path else {
            return Tuning::default();
        };
        let loaded = std::fs::read_to_string(path)
            .map_err(chroma_drop::Error::from)
            .and_then(|json| Tuning::from_json(&json));
        match loaded {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Err(e) => {
                log::warn!("Failed to load tuning from {}, using defaults: {}", path, e);
                Tuning::default()
            }
        }
    }

    /// `chroma-drop [seed] [tuning.json]`
    pub fn run() {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let seed = args
            .first()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or_else(|| {
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or(0)
            });
        let tuning = load_tuning(args.get(1).map(String::as_str));

        log::info!("Headless autopilot run, seed {}", seed);
        let summary = autopilot_run(seed, &tuning, DEFAULT_MAX_TICKS);

        let mut store: Box<dyn KeyValueStore> = match open_default() {
            Ok(store) => store,
            Err(e) => {
                log::warn!("Save file unavailable, scores kept in memory: {}", e);
                Box::new(MemoryStore::new())
            }
        };
        let mut high_scores = HighScores::load(store.as_ref());
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0);
        let rank = high_scores.add_score(summary.score, summary.level, timestamp);
        if rank.is_some() {
            if let Err(e) = high_scores.save(store.as_mut()) {
                log::warn!("Failed to save high scores: {}", e);
            }
        }

        println!("Chroma Drop autopilot (seed {})", summary.seed);
        println!(
            "  {} after {:.1}s",
            if summary.game_over { "Game over" } else { "Time limit" },
            summary.ticks as f32 * SIM_DT
        );
        println!("  Score: {}  Level: {}", summary.score, summary.level);
        match rank {
            Some(rank) => println!("  New high score, rank #{}", rank),
            None => println!("  Best: {}", high_scores.top_score()),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    headless::run();
}
