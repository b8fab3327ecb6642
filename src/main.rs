//! Foodie Balls entry point
//!
//! On the web this wires the session to a canvas, pointer input and the page
//! controls. Natively it plays a headless autopilot run and logs the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::{PI, TAU};
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlButtonElement, HtmlCanvasElement, MouseEvent,
        TouchEvent,
    };

    use foodie_balls::audio::SharedAudio;
    use foodie_balls::hooks::AuthService;
    use foodie_balls::sim::GameState;
    use foodie_balls::{GameConfig, Leaderboard, Session, css_color};

    /// Login state the auth pages leave in LocalStorage
    struct StoredAuth;

    impl StoredAuth {
        fn read(key: &str) -> Option<String> {
            web_sys::window()?
                .local_storage()
                .ok()??
                .get_item(key)
                .ok()?
        }
    }

    impl AuthService for StoredAuth {
        fn is_authenticated(&self) -> bool {
            Self::read("authToken").is_some()
        }

        fn username(&self) -> Option<String> {
            Self::read("username")
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Session,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        audio: SharedAudio,
        leaderboard: Leaderboard,
        /// Start on the next animation frame so the run clock shares its timebase
        pending_start: bool,
        /// An animation frame is requested
        looping: bool,
    }

    impl Game {
        fn canvas_size(&self) -> (f32, f32) {
            (
                self.canvas.client_width().max(1) as f32,
                self.canvas.client_height().max(1) as f32,
            )
        }

        /// Match the backing store to the displayed size
        fn fit_canvas(&mut self) {
            let (w, h) = self.canvas_size();
            self.canvas.set_width(w as u32);
            self.canvas.set_height(h as u32);
            self.session.resize(w, h);
        }

        fn render(&self) {
            let ctx = &self.ctx;
            let state = self.session.state();
            ctx.clear_rect(0.0, 0.0, state.bounds.width as f64, state.bounds.height as f64);

            for veg in &state.vegetables {
                draw_vegetable(ctx, veg.pos, veg.radius, veg.rotation);
            }
            draw_balls(ctx, state);
            for e in &state.explosions {
                ctx.set_global_alpha(e.alpha as f64);
                ctx.set_stroke_style_str(&css_color(e.color));
                ctx.set_line_width(4.0);
                ctx.begin_path();
                ctx.arc(e.pos.x as f64, e.pos.y as f64, e.radius as f64, 0.0, TAU).ok();
                ctx.stroke();
            }
            for p in state.active_particles() {
                ctx.set_global_alpha(p.alpha as f64);
                ctx.set_fill_style_str(&css_color(p.color));
                ctx.begin_path();
                ctx.arc(p.pos.x as f64, p.pos.y as f64, p.size as f64 / 2.0, 0.0, TAU).ok();
                ctx.fill();
            }
            ctx.set_global_alpha(1.0);
            draw_player(ctx, state);
        }

        fn update_hud(&self, document: &Document) {
            set_text(document, "time", &format!("{:.1}", self.session.elapsed_secs()));
            set_text(document, "size", &self.session.size_value().to_string());
        }

        /// Show the end-of-run panel
        fn show_game_over(&self, document: &Document) {
            let Some(outcome) = self.session.outcome() else {
                return;
            };
            set_text(document, "final-score", &format!("{:.1}", outcome.final_score_secs));
            set_text(document, "game-over-message", outcome.message());
            set_hidden(document, "game-over", false);
            set_hidden(document, "hud", true);
            set_hidden(document, "start-btn", false);

            if let Some(btn) = button(document, "submit-btn") {
                let allowed = self.session.can_submit_score(&StoredAuth);
                btn.set_disabled(!allowed);
                btn.set_text_content(Some(if allowed {
                    "Submit score"
                } else {
                    "Log in to submit your score"
                }));
            }
        }

        fn render_leaderboard(&self, document: &Document) {
            let Some(list) = document.get_element_by_id("leaderboard-list") else {
                return;
            };
            let me = StoredAuth.username();
            let rows: String = self
                .leaderboard
                .entries
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    let class = if me.as_deref() == Some(e.username.as_str()) {
                        " class=\"me\""
                    } else {
                        ""
                    };
                    format!(
                        "<tr{class}><td>{}</td><td>{}</td><td>{:.1}</td></tr>",
                        i + 1,
                        escape_html(&e.username),
                        e.score
                    )
                })
                .collect();
            list.set_inner_html(&rows);
        }
    }

    fn draw_balls(ctx: &CanvasRenderingContext2d, state: &GameState) {
        for ball in state.active_balls() {
            let color = css_color(ball.color);
            let mut radius = ball.radius as f64;
            if ball.glowing {
                // Armed balls throb while the fuse burns
                radius *= 1.0 + 0.1 * (ball.pulse_phase() as f64).sin();
                ctx.set_shadow_color(&color);
                ctx.set_shadow_blur(15.0);
            }
            ctx.set_fill_style_str(&color);
            ctx.begin_path();
            ctx.arc(ball.pos.x as f64, ball.pos.y as f64, radius, 0.0, TAU).ok();
            ctx.fill();
            ctx.set_shadow_blur(0.0);
        }
    }

    fn draw_vegetable(ctx: &CanvasRenderingContext2d, pos: Vec2, radius: f32, rotation: f32) {
        let r = radius as f64;
        ctx.save();
        ctx.translate(pos.x as f64, pos.y as f64).ok();
        ctx.rotate(rotation as f64).ok();
        ctx.set_fill_style_str("#4ADE80");

        ctx.begin_path();
        ctx.rect(-r / 6.0, 0.0, r / 3.0, r / 1.5);
        ctx.fill();

        for i in 0..7 {
            let angle = i as f64 / 7.0 * TAU;
            ctx.begin_path();
            ctx.arc(
                angle.cos() * r * 0.33,
                angle.sin() * r * 0.33 - r * 0.3,
                r * 0.7 * 0.55,
                0.0,
                TAU,
            )
            .ok();
            ctx.fill();
        }
        ctx.restore();
    }

    fn draw_player(ctx: &CanvasRenderingContext2d, state: &GameState) {
        let p = &state.player;
        let (x, y, r) = (p.pos.x as f64, p.pos.y as f64, p.radius as f64);

        ctx.set_fill_style_str("#FDE047");
        ctx.begin_path();
        ctx.arc(x, y, r, 0.0, TAU).ok();
        ctx.fill();

        let eye = (r * 0.15).max(3.0);
        let offset = (r * 0.25).max(4.0);
        let mouth = (r * 0.3).max(5.0);

        ctx.set_fill_style_str("#333");
        for dx in [-offset, offset] {
            ctx.begin_path();
            ctx.arc(x + dx, y - offset * 0.5, eye, 0.0, TAU).ok();
            ctx.fill();
        }

        ctx.set_stroke_style_str("#333");
        ctx.set_line_width((r * 0.08).max(2.0));
        ctx.begin_path();
        ctx.arc(x, y + offset * 0.7, mouth, 0.0, PI).ok();
        ctx.stroke();
    }

    fn escape_html(s: &str) -> String {
        s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let classes = el.class_list();
            let _ = if hidden {
                classes.add_1("hidden")
            } else {
                classes.remove_1("hidden")
            };
        }
    }

    fn button(document: &Document, id: &str) -> Option<HtmlButtonElement> {
        document.get_element_by_id(id)?.dyn_into().ok()
    }

    fn current_document() -> Option<Document> {
        web_sys::window()?.document()
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialised".into());
        }

        log::info!("Foodie Balls starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game-canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let seed = js_sys::Date::now() as u64;
        let mut session = Session::new(GameConfig::default(), seed)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let audio = SharedAudio::default();
        session.add_observer(Box::new(audio.clone()));

        let game = Rc::new(RefCell::new(Game {
            session,
            canvas: canvas.clone(),
            ctx,
            audio,
            leaderboard: Leaderboard::load(),
            pending_start: false,
            looping: false,
        }));
        {
            let mut g = game.borrow_mut();
            g.fit_canvas();
            g.render_leaderboard(&document);
        }
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(&document, game.clone());
        setup_resize(game);

        log::info!("Foodie Balls ready");
        Ok(())
    }

    fn pointer_pos(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> Vec2 {
        let rect = canvas.get_bounding_client_rect();
        Vec2::new(
            client_x as f32 - rect.left() as f32,
            client_y as f32 - rect.top() as f32,
        )
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse down - grab the player
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = pointer_pos(&canvas_clone, event.client_x(), event.client_y());
                game.borrow_mut().session.pointer_down(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move - pull toward the cursor while dragging
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = pointer_pos(&canvas_clone, event.client_x(), event.client_y());
                game.borrow_mut().session.pointer_move(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let pos = pointer_pos(&canvas_clone, touch.client_x(), touch.client_y());
                    game.borrow_mut().session.pointer_down(pos);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let pos = pointer_pos(&canvas_clone, touch.client_x(), touch.client_y());
                    game.borrow_mut().session.pointer_move(pos);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Release ends the drag
        for name in ["mouseup", "mouseleave", "touchend", "touchcancel"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().session.pointer_up();
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        if let Some(btn) = document.get_element_by_id("start-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.session.is_running() {
                    return;
                }
                g.audio.0.borrow().resume();
                g.pending_start = true;
                if !g.looping {
                    g.looping = true;
                    drop(g);
                    request_animation_frame(game.clone());
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("submit-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let Some(document) = current_document() else { return };
                let mut g = game.borrow_mut();
                let g = &mut *g;
                match g
                    .session
                    .submit_score(&mut g.leaderboard, &StoredAuth, js_sys::Date::now())
                {
                    Some(rank) => {
                        log::info!("Score submitted, rank {}", rank);
                        g.leaderboard.save();
                    }
                    None => log::warn!("Score submission refused"),
                }
                g.render_leaderboard(&document);
                if let Some(btn) = button(&document, "submit-btn") {
                    btn.set_disabled(true);
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("mute-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let muted = game.borrow().audio.0.borrow_mut().toggle_mute();
                if let Some(document) = current_document() {
                    set_text(&document, "mute-btn", if muted { "Unmute" } else { "Mute" });
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().fit_canvas();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
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
        let Some(document) = current_document() else { return };
        let running = {
            let mut g = game.borrow_mut();

            if g.pending_start {
                g.pending_start = false;
                let (w, h) = g.canvas_size();
                g.session.start(time, w, h);
                set_hidden(&document, "game-over", true);
                set_hidden(&document, "start-btn", true);
                set_hidden(&document, "hud", false);
            }

            let running = g.session.frame(time);
            g.render();
            g.update_hud(&document);
            if !running {
                g.looping = false;
                g.show_game_over(&document);
            }
            running
        };

        // A finished run stops asking for frames
        if running {
            request_animation_frame(game);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use glam::Vec2;

    use foodie_balls::hooks::{FixedAuth, GameObserver};
    use foodie_balls::sim::{BallType, EndReason, GameState};
    use foodie_balls::{GameConfig, Leaderboard, Session};

    /// ~60 fps
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after ten minutes of game time
    const MAX_FRAMES: u32 = 36_000;

    #[derive(Default)]
    struct EventLog {
        eaten: u32,
        vegetables: u32,
        explosions: u32,
    }

    impl GameObserver for EventLog {
        fn on_ball_eaten(&mut self, _pos: Vec2, _color: u32) {
            self.eaten += 1;
        }

        fn on_vegetable_eaten(&mut self) {
            self.vegetables += 1;
            log::debug!("Vegetable eaten ({} so far)", self.vegetables);
        }

        fn on_explosion(&mut self, pos: Vec2, _color: u32) {
            self.explosions += 1;
            log::debug!("Explosion at ({:.0}, {:.0})", pos.x, pos.y);
        }

        fn on_session_end(&mut self, final_score: f64, reason: EndReason) {
            log::info!(
                "Ended after {:.1}s ({:?}): {} balls, {} vegetables, {} explosions",
                final_score,
                reason,
                self.eaten,
                self.vegetables,
                self.explosions
            );
        }
    }

    /// Head for the nearest orange ball while shying away from green ones
    fn steer(state: &GameState) -> Option<Vec2> {
        let me = state.player.pos;
        let target = state
            .active_balls()
            .filter(|b| b.kind.ball_type() == BallType::Orange)
            .min_by(|a, b| a.pos.distance_squared(me).total_cmp(&b.pos.distance_squared(me)))?;

        let mut dir = (target.pos - me).normalize_or_zero();
        for threat in state
            .active_balls()
            .filter(|b| b.kind.ball_type() != BallType::Orange)
        {
            let away = me - threat.pos;
            let d = away.length();
            if d < state.player.radius * 3.0 {
                dir += away.normalize_or_zero() * 2.0;
            }
        }
        Some(me + dir.normalize_or_zero() * 5.0)
    }

    pub fn run(seed: u64) {
        let config = match std::env::var("FOODIE_CONFIG") {
            Ok(path) => match std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|json| GameConfig::from_json(&json).map_err(|e| e.to_string()))
            {
                Ok(config) => {
                    log::info!("Loaded config from {}", path);
                    config
                }
                Err(e) => {
                    log::error!("Bad config {}: {}", path, e);
                    return;
                }
            },
            Err(_) => GameConfig::default(),
        };

        let mut session = match Session::new(config, seed) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Invalid config: {}", e);
                return;
            }
        };
        session.add_observer(Box::new(EventLog::default()));
        session.start(0.0, 800.0, 600.0);
        log::info!("Autopilot run with seed {}", seed);

        let mut now = 0.0;
        for _ in 0..MAX_FRAMES {
            now += FRAME_MS;
            let pos = session.state().player.pos;
            session.pointer_down(pos);
            if let Some(target) = steer(session.state()) {
                session.pointer_move(target);
            }
            if !session.frame(now) {
                break;
            }
        }

        match session.outcome() {
            Some(outcome) => {
                println!("{} Survived {:.1}s.", outcome.message(), outcome.final_score_secs);
                let mut board = Leaderboard::load();
                let auth = FixedAuth::signed_in("autopilot");
                if let Some(rank) = session.submit_score(&mut board, &auth, now) {
                    log::info!("Leaderboard rank {}", rank);
                }
            }
            None => println!(
                "Still going after {:.1}s at size {}",
                session.elapsed_secs(),
                session.size_value()
            ),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Foodie Balls (native) starting...");
    log::info!("Native mode is a headless demo - build for wasm32 to play in the browser");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    autopilot::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
