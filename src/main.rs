//! Dino Run entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlElement, HtmlInputElement, KeyboardEvent, TouchEvent};

    use dino_run::config::GameConfig;
    use dino_run::flags::{ConfigurationSnapshot, FlagClient, RemoteFlagSource};
    use dino_run::game::{Game, Services};
    use dino_run::persistence::{BrowserStorage, KeyValueStore, MemoryStore};
    use dino_run::platform;
    use dino_run::renderer::CanvasSurface;
    use dino_run::settings::Weather;
    use dino_run::telemetry::LogSink;
    use dino_run::ui::Overlay;

    type SharedGame = Rc<RefCell<Game<RemoteFlagSource>>>;
    type SharedFlags = Rc<FlagClient<RemoteFlagSource>>;

    /// HUD and overlays in the host page
    struct DomOverlay {
        document: Document,
        canvas: HtmlCanvasElement,
    }

    impl DomOverlay {
        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_visible(&self, id: &str, visible: bool) {
            let Some(el) = self
                .document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            else {
                return;
            };
            let style = el.style();
            if visible {
                let _ = style.remove_property("display");
            } else {
                let _ = style.set_property("display", "none");
            }
        }
    }

    impl Overlay for DomOverlay {
        fn show_score(&mut self, score: u64) {
            self.set_text("score", &score.to_string());
        }

        fn show_high_score(&mut self, best: u64) {
            self.set_text("highScore", &best.to_string());
        }

        fn show_status(&mut self, status: &str) {
            self.set_text("gameStatus", status);
        }

        fn show_restart(&mut self, visible: bool) {
            self.set_visible("restartBtn", visible);
        }

        fn show_theme(&mut self, weather: Weather) {
            let classes = self.canvas.class_list();
            for w in Weather::ALL {
                let _ = classes.remove_1(w.css_class());
            }
            let _ = classes.add_1(weather.css_class());
            let _ = self
                .canvas
                .style()
                .set_property("background", weather.background());
        }

        fn show_flags(&mut self, snapshot: &ConfigurationSnapshot) {
            self.set_text("dino-color-value", &snapshot.dino_color);
            self.set_text("difficulty-value", &snapshot.difficulty);
            self.set_text("weather-value", &snapshot.weather);
            self.set_text("obstacle-type-value", &snapshot.obstacle_style);
        }

        fn show_welcome(&mut self, returning: Option<&str>) {
            match returning {
                Some(name) => {
                    self.set_text("returningPlayerName", name);
                    self.set_visible("gameStartOverlay", false);
                    self.set_visible("quickStartOverlay", true);
                }
                None => {
                    self.set_visible("quickStartOverlay", false);
                    self.set_visible("gameStartOverlay", true);
                }
            }
        }

        fn hide_start_overlays(&mut self) {
            self.set_visible("gameStartOverlay", false);
            self.set_visible("quickStartOverlay", false);
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Dino Run starting...");

        let config = GameConfig::load();

        // No drawing surface, no game
        let surface = match CanvasSurface::from_config(&config.canvas) {
            Ok(surface) => Rc::new(surface),
            Err(e) => {
                log::error!("Cannot start: {}", e);
                return;
            }
        };
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("Cannot start: no document");
            return;
        };

        let store: Box<dyn KeyValueStore> = match BrowserStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                log::warn!("{}, scores will not persist", e);
                Box::new(MemoryStore::new())
            }
        };
        let overlay = DomOverlay {
            document: document.clone(),
            canvas: surface.element().clone(),
        };

        let flags: SharedFlags = Rc::new(FlagClient::new(
            RemoteFlagSource::new(config.flags.clone()),
            config.flags.clone(),
        ));
        let game: SharedGame = Rc::new(RefCell::new(Game::new(
            &config,
            flags.clone(),
            Services {
                store,
                telemetry: Box::new(LogSink),
                overlay: Box::new(overlay),
            },
            platform::now_ms(),
        )));

        // Flags load in the background; play starts on defaults
        {
            let flags = flags.clone();
            wasm_bindgen_futures::spawn_local(async move {
                flags.initialize(None).await;
            });
        }

        setup_input_handlers(&document, surface.element(), game.clone());
        setup_buttons(&document, game.clone());

        request_animation_frame(game, surface);

        log::info!("Dino Run running!");
    }

    fn identify(flags: SharedFlags, ctx: dino_run::flags::UserContext) {
        wasm_bindgen_futures::spawn_local(async move {
            flags.identify(ctx).await;
        });
    }

    fn setup_input_handlers(document: &Document, canvas: &HtmlCanvasElement, game: SharedGame) {
        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                // Leave typing in the name field alone
                let typing = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                    .is_some();
                if typing {
                    return;
                }

                #[cfg(feature = "test-hooks")]
                if event.alt_key() && cycle_flag_shortcut(&game, &event.key()) {
                    event.prevent_default();
                    return;
                }

                match event.code().as_str() {
                    "Space" => {
                        event.prevent_default();
                        game.borrow_mut().handle_action(platform::now_ms());
                    }
                    "Escape" => game.borrow_mut().toggle_pause(),
                    _ => {}
                }
            });
            let _ = document
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().handle_action(platform::now_ms());
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, game: SharedGame) {
        if let Some(btn) = document.get_element_by_id("restartBtn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().restart(platform::now_ms());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // First-time name entry
        if let Some(btn) = document.get_element_by_id("startGameButton") {
            let game = game.clone();
            let document = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let name = document
                    .get_element_by_id("playerName")
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                    .map(|input| input.value())
                    .unwrap_or_default();

                let now = platform::now_ms();
                let mut g = game.borrow_mut();
                if !name.trim().is_empty() {
                    let ctx = g.register_player(&name, now);
                    identify(g.flags().clone(), ctx);
                }
                g.start(now);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Returning player
        if let Some(btn) = document.get_element_by_id("quickStartButton") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let now = platform::now_ms();
                let mut g = game.borrow_mut();
                if let Some(name) = g.profile().map(|p| p.name.clone()) {
                    let ctx = g.register_player(&name, now);
                    identify(g.flags().clone(), ctx);
                }
                g.start(now);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Alt+1..4 step through the values of one flag
    #[cfg(feature = "test-hooks")]
    fn cycle_flag_shortcut(game: &SharedGame, key: &str) -> bool {
        use dino_run::flags::FlagKey;
        use dino_run::settings::{Difficulty, DinoColor};

        let colors: Vec<&str> = DinoColor::ALL.iter().map(|c| c.as_str()).collect();
        let difficulties: Vec<&str> = Difficulty::ALL.iter().map(|d| d.as_str()).collect();
        let weathers: Vec<&str> = Weather::ALL.iter().map(|w| w.as_str()).collect();

        let (flag, options) = match key {
            "1" => (FlagKey::DinoColor, colors),
            "2" => (FlagKey::Difficulty, difficulties),
            "3" => (FlagKey::Weather, weathers),
            "4" => (FlagKey::ObstacleType, vec!["logos", "classic"]),
            _ => return false,
        };

        let flags = game.borrow().flags().clone();
        let current = flags.flag(flag);
        let next = options
            .iter()
            .position(|o| *o == current)
            .map_or(0, |i| (i + 1) % options.len());
        log::info!("[test-hooks] {} -> {}", flag.as_str(), options[next]);
        flags.set_flag(flag, options[next]);
        true
    }

    fn request_animation_frame(game: SharedGame, surface: Rc<CanvasSurface>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game, surface);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: SharedGame, surface: Rc<CanvasSurface>) {
        let (result, refresh) = {
            let mut g = game.borrow_mut();
            let result = g.frame(platform::now_ms());
            surface.present(&g.draw_commands());
            let refresh = g.wants_refresh().then(|| g.flags().clone());
            (result, refresh)
        };

        if let Some(flags) = refresh {
            wasm_bindgen_futures::spawn_local(async move {
                flags.refresh().await;
            });
        }

        match result {
            Ok(_) => request_animation_frame(game, surface),
            Err(e) => log::error!("Game loop stopped: {}", e),
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use dino_run::config::GameConfig;
    use dino_run::flags::{FileFlagSource, OfflineFlagSource};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Dino Run (native) starting...");
    log::info!("Browser play needs the wasm build; running one headless session");

    let config = GameConfig::load();
    match FileFlagSource::from_env() {
        Some(source) => headless::run(&config, source),
        None => headless::run(&config, OfflineFlagSource),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// One autopiloted session without a display
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::rc::Rc;

    use dino_run::config::GameConfig;
    use dino_run::flags::{FlagClient, FlagSource};
    use dino_run::game::{Game, Services};
    use dino_run::persistence::MemoryStore;
    use dino_run::platform;
    use dino_run::sim::Session;
    use dino_run::telemetry::LogSink;
    use dino_run::ui::NullOverlay;

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Five minutes at 60 fps
    const MAX_FRAMES: u32 = 60 * 60 * 5;
    /// Frames of travel before an obstacle reaches the player
    const LOOKAHEAD_FRAMES: f32 = 7.0;

    pub fn run<S: FlagSource>(config: &GameConfig, source: S) {
        let flags = Rc::new(FlagClient::new(source, config.flags.clone()));
        pollster::block_on(flags.initialize(None));

        let mut now = platform::now_ms();
        let mut game = Game::new(
            config,
            flags,
            Services {
                store: Box::new(MemoryStore::new()),
                telemetry: Box::new(LogSink),
                overlay: Box::new(NullOverlay),
            },
            now,
        );
        game.start(now);

        for _ in 0..MAX_FRAMES {
            if should_jump(game.session()) {
                game.handle_action(now);
            }
            now += FRAME_MS;
            match game.frame(now) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    log::error!("Headless run halted: {}", e);
                    break;
                }
            }
            if game.wants_refresh() {
                pollster::block_on(game.flags().refresh());
            }
        }

        let session = game.session();
        log::info!(
            "Headless run finished: score {} after {} frames ({})",
            session.score,
            session.frame_count,
            session.phase.as_str()
        );
    }

    /// Jump when the nearest obstacle ahead is about to arrive
    fn should_jump(session: &Session) -> bool {
        let player = &session.player;
        if player.airborne {
            return false;
        }
        let speed = session.difficulty.obstacle_speed * session.speed_multiplier;
        let front = player.pos.x + player.size.x;
        session.obstacles.iter().any(|o| {
            let gap = o.pos.x - front;
            gap > 0.0 && gap < speed * LOOKAHEAD_FRAMES
        })
    }
}
