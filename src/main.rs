//! Verse Trail entry point
//!
//! Handles platform-specific initialization and runs the frame loop. On the
//! web the embedding page supplies the renderer through `window.sceneHost`;
//! natively the scene runs headless against a null presenter, which doubles
//! as an end-to-end smoke run of the whole script.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_scene {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{
        Element, HtmlAudioElement, HtmlElement, PointerEvent, Request, RequestCache, RequestInit,
        Response,
    };

    use verse_trail::assets::{resolve_model, AssetError, AssetKind, AssetUrls, ModelSource, ResolvedModel};
    use verse_trail::audio::{AudioDirector, AudioTrack, TrackStatus};
    use verse_trail::presenter::{SceneFrame, ScenePresenter};
    use verse_trail::script::{self, ScriptCue, ScriptPlayer};
    use verse_trail::settings::SceneSettings;
    use verse_trail::sim::{step, FrameClock, FrameInput, MotionMode, PropId, WorldState};
    use verse_trail::ui::{Hud, UiDirector};

    /// Renderer boundary. The page installs `window.sceneHost` before loading
    /// the module; model decoding, the scene graph, picking geometry, and all
    /// drawing live on that side.
    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = ["window", "sceneHost"], js_name = applyFrame)]
        fn host_apply_frame(frame_json: &str);

        #[wasm_bindgen(js_namespace = ["window", "sceneHost"], js_name = resize)]
        fn host_resize(width: u32, height: u32);

        /// Raycast at viewport coords (0..1 from top-left); the id of the
        /// prop whose node was hit, or -1.
        #[wasm_bindgen(js_namespace = ["window", "sceneHost"], js_name = pick)]
        fn host_pick(u: f32, v: f32) -> f64;

        /// Fetch + decode a model slot, normalized to the given height.
        /// Resolves to a JSON array of animation clip names.
        #[wasm_bindgen(js_namespace = ["window", "sceneHost"], js_name = loadModel, catch)]
        async fn host_load_model(
            slot: &str,
            url: &str,
            target_height: f32,
        ) -> Result<JsValue, JsValue>;

        /// Install the built-in primitive placeholder for a model slot.
        #[wasm_bindgen(js_namespace = ["window", "sceneHost"], js_name = usePlaceholder)]
        fn host_use_placeholder(slot: &str, color: u32, target_height: f32);
    }

    fn slot_name(kind: AssetKind) -> &'static str {
        match kind {
            AssetKind::LeaderActor => "leader",
            AssetKind::FollowerActor => "follower",
            AssetKind::MeatProp => "meat",
        }
    }

    /// Forwards serialized frames across the bridge.
    struct BridgePresenter;

    impl ScenePresenter for BridgePresenter {
        fn present(&mut self, frame: &SceneFrame) {
            match serde_json::to_string(frame) {
                Ok(json) => host_apply_frame(&json),
                Err(err) => log::warn!("frame serialization failed: {err}"),
            }
        }

        fn resize(&mut self, width: u32, height: u32) {
            host_resize(width, height);
        }
    }

    /// `HtmlAudioElement`-backed track. `play()` resolves asynchronously, so
    /// the outcome is parked in a shared cell the director polls.
    struct DomTrack {
        element: HtmlAudioElement,
        status: Rc<Cell<TrackStatus>>,
    }

    impl DomTrack {
        fn new(url: &str) -> Option<Self> {
            let element = HtmlAudioElement::new_with_src(url).ok()?;
            element.set_preload("auto");
            let status = Rc::new(Cell::new(TrackStatus::Idle));
            {
                let status = status.clone();
                let on_ended = Closure::<dyn FnMut(_)>::new(move |_: web_sys::Event| {
                    status.set(TrackStatus::Ended);
                });
                let _ = element
                    .add_event_listener_with_callback("ended", on_ended.as_ref().unchecked_ref());
                on_ended.forget();
            }
            Some(Self { element, status })
        }
    }

    impl AudioTrack for DomTrack {
        fn request_play(&mut self) {
            self.status.set(TrackStatus::Requested);
            self.element.set_current_time(0.0);
            match self.element.play() {
                Ok(promise) => {
                    let status = self.status.clone();
                    wasm_bindgen_futures::spawn_local(async move {
                        match JsFuture::from(promise).await {
                            // Don't clobber an 'ended' that raced the resolve.
                            Ok(_) => {
                                if status.get() != TrackStatus::Ended {
                                    status.set(TrackStatus::Playing);
                                }
                            }
                            Err(_) => status.set(TrackStatus::Blocked),
                        }
                    });
                }
                Err(_) => self.status.set(TrackStatus::Blocked),
            }
        }

        fn status(&self) -> TrackStatus {
            self.status.get()
        }

        fn set_volume(&mut self, volume: f32) {
            self.element.set_volume(volume as f64);
        }

        fn set_looping(&mut self, looping: bool) {
            self.element.set_loop(looping);
        }
    }

    /// HUD over the page's DOM elements. Every call tolerates a missing
    /// element, so a stripped-down page still works.
    struct DomHud {
        document: web_sys::Document,
        reduced_motion: bool,
    }

    impl DomHud {
        fn new(document: web_sys::Document, reduced_motion: bool) -> Self {
            Self {
                document,
                reduced_motion,
            }
        }

        fn by_id(&self, id: &str) -> Option<Element> {
            self.document.get_element_by_id(id)
        }

        fn toggle_hidden(&self, id: &str, visible: bool) {
            if let Some(el) = self.by_id(id) {
                let _ = el.class_list().toggle_with_force("isHidden", !visible);
            }
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn restart_crawl(&self) {
            if self.reduced_motion {
                return;
            }
            if let Some(el) = self.by_id("crawl") {
                let _ = el.class_list().remove_1("flow");
                // Force a reflow so the CSS animation restarts.
                if let Some(html) = el.dyn_ref::<HtmlElement>() {
                    let _ = html.offset_width();
                }
                let _ = el.class_list().add_1("flow");
            }
        }
    }

    impl Hud for DomHud {
        fn set_loading(&mut self, text: Option<&str>) {
            self.toggle_hidden("loader", text.is_some());
            if let Some(text) = text {
                self.set_text("loaderText", text);
            }
        }

        fn set_verse(&mut self, reference: &str, line: &str) {
            self.set_text("ref", reference);
            self.set_text("line", line);
            self.restart_crawl();
        }

        fn set_sound_hint(&mut self, visible: bool) {
            self.toggle_hidden("soundHint", visible);
        }

        fn set_tap_hint(&mut self, visible: bool) {
            self.toggle_hidden("tapHint", visible);
        }

        fn set_counter_visible(&mut self, visible: bool) {
            self.toggle_hidden("meatCounter", visible);
        }

        fn set_counter(&mut self, value: u32) {
            self.set_text("meatCountNum", &value.to_string());
        }

        fn set_counter_bump(&mut self, active: bool) {
            if let Some(el) = self.by_id("meatCounter") {
                let _ = el.class_list().toggle_with_force("bump", active);
            }
        }

        fn set_combo(&mut self, multiplier: u32) {
            self.set_text("comboMult", &format!("x{multiplier}"));
            self.toggle_hidden("comboMult", multiplier > 1);
        }

        fn show_victory(&mut self) {
            self.toggle_hidden("victory", true);
        }
    }

    /// Everything the frame loop owns.
    struct App {
        world: WorldState,
        clock: FrameClock,
        player: ScriptPlayer,
        audio: AudioDirector,
        ui: UiDirector,
        hud: DomHud,
        presenter: BridgePresenter,
        input: FrameInput,
    }

    impl App {
        fn frame(&mut self, now_ms: f64) {
            // First invocation only records the timestamp.
            let Some(dt) = self.clock.delta(now_ms / 1000.0) else {
                return;
            };

            let mut events = Vec::new();
            for cue in self.player.advance(dt) {
                match &cue {
                    ScriptCue::EnterWalk => self.world.set_mode(MotionMode::Walk, &mut events),
                    ScriptCue::EnterRun => self.world.set_mode(MotionMode::Run, &mut events),
                    ScriptCue::BeginAudio => self.audio.begin(),
                    ScriptCue::Finished => log::info!("script finished; scene keeps running"),
                    ScriptCue::ShowText { .. } => {}
                }
                self.ui.handle_cue(&cue, &mut self.hud);
            }

            let input = std::mem::take(&mut self.input);
            events.extend(step(&mut self.world, &input, dt));
            for event in &events {
                self.ui.handle_event(event, &mut self.hud);
            }

            self.audio.update();
            self.ui
                .sync_sound_hint(self.audio.hint_visible(), &mut self.hud);
            self.ui.update(dt, &mut self.hud);

            self.presenter.present(&SceneFrame::capture(&self.world));
        }
    }

    async fn asset_exists(url: &str) -> bool {
        let Some(window) = web_sys::window() else {
            return false;
        };
        let init = RequestInit::new();
        init.set_method("HEAD");
        init.set_cache(RequestCache::NoStore);
        let Ok(request) = Request::new_with_str_and_init(url, &init) else {
            return false;
        };
        match JsFuture::from(window.fetch_with_request(&request)).await {
            Ok(value) => value
                .dyn_into::<Response>()
                .map(|r| r.ok())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn fetch_text(url: &str) -> Option<String> {
        let window = web_sys::window()?;
        let init = RequestInit::new();
        init.set_method("GET");
        init.set_cache(RequestCache::NoStore);
        let request = Request::new_with_str_and_init(url, &init).ok()?;
        let response = JsFuture::from(window.fetch_with_request(&request)).await.ok()?;
        let response: Response = response.dyn_into().ok()?;
        if !response.ok() {
            return None;
        }
        let text = JsFuture::from(response.text().ok()?).await.ok()?;
        text.as_string()
    }

    /// Probe, load, and resolve one model slot; placeholders are installed on
    /// the host side so the scene never comes up empty.
    async fn load_model_slot(kind: AssetKind, url: &str) -> ResolvedModel {
        let loaded = if asset_exists(url).await {
            match host_load_model(slot_name(kind), url, kind.target_height()).await {
                Ok(value) => {
                    let clips = value
                        .as_string()
                        .and_then(|json| serde_json::from_str::<Vec<String>>(&json).ok())
                        .unwrap_or_default();
                    Ok(clips)
                }
                Err(err) => Err(AssetError::LoadFailed(format!("{err:?}"))),
            }
        } else {
            Err(AssetError::Missing)
        };

        let model = resolve_model(kind, loaded);
        if model.source == ModelSource::Placeholder {
            host_use_placeholder(slot_name(kind), kind.placeholder_color(), kind.target_height());
        }
        model
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Verse Trail starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let reduced_motion = window
            .match_media("(prefers-reduced-motion: reduce)")
            .ok()
            .flatten()
            .map(|m| m.matches())
            .unwrap_or(false);
        let settings = SceneSettings {
            reduced_motion,
            ..SceneSettings::default()
        };
        let counter_enabled = settings.counter_enabled;
        let audio_enabled = settings.audio_enabled;

        let mut hud = DomHud::new(document.clone(), reduced_motion);
        hud.set_loading(Some("Loading…"));
        hud.set_verse("Loading…", "Preparing the scene.");
        hud.set_counter_visible(false);
        hud.set_tap_hint(false);

        let urls = AssetUrls::default();

        // Audio first, so the greeting→music handoff is armed before the
        // crawl begins.
        let mut audio = AudioDirector::new(audio_enabled);
        if audio_enabled {
            let greeting_url = if asset_exists(urls.greeting_primary).await {
                Some(urls.greeting_primary)
            } else if asset_exists(urls.greeting_fallback).await {
                Some(urls.greeting_fallback)
            } else {
                None
            };
            if let Some(url) = greeting_url {
                if let Some(track) = DomTrack::new(url) {
                    audio.set_greeting(Box::new(track), settings.greeting_volume);
                }
            }
            if asset_exists(urls.music).await {
                if let Some(track) = DomTrack::new(urls.music) {
                    audio.set_music(Box::new(track), settings.music_volume);
                }
            }
        }

        // Optional override feed; anything invalid falls back silently.
        let blocks = match fetch_text("assets/verses.json").await {
            Some(json) => script::parse_override(&json).unwrap_or_else(script::default_script),
            None => script::default_script(),
        };

        hud.set_loading(Some("Loading the walkers…"));
        let leader = load_model_slot(AssetKind::LeaderActor, urls.leader_model).await;
        let follower = load_model_slot(AssetKind::FollowerActor, urls.follower_model).await;
        hud.set_loading(Some("Loading the meat…"));
        load_model_slot(AssetKind::MeatProp, urls.meat_model).await;
        hud.set_loading(Some("Starting…"));

        let seed = js_sys::Date::now() as u64;
        let mut world = WorldState::new(seed, settings);
        world.actors.leader.clips = leader.clips;
        world.actors.follower.clips = follower.clips;
        log::info!("scene initialized with seed: {seed}");

        let mut presenter = BridgePresenter;
        if let Some(canvas) = document.get_element_by_id("c") {
            let rect = canvas.get_bounding_client_rect();
            presenter.resize(rect.width().max(1.0) as u32, rect.height().max(1.0) as u32);
        }

        let app = Rc::new(RefCell::new(App {
            world,
            clock: FrameClock::new(),
            player: ScriptPlayer::new(blocks),
            audio,
            ui: UiDirector::new(counter_enabled),
            hud,
            presenter,
            input: FrameInput::default(),
        }));

        setup_tap_collect(&app, &document);
        setup_gesture_retry(&app, &window);
        setup_resize(&app, &window, &document);

        app.borrow_mut().hud.set_loading(None);
        request_animation_frame(app);

        log::info!("Verse Trail running!");
    }

    /// Canvas taps: resolve a pick through the host and queue the tap for the
    /// next tick. Every tap also counts as a gesture for blocked audio.
    fn setup_tap_collect(app: &Rc<RefCell<App>>, document: &web_sys::Document) {
        let Some(canvas) = document.get_element_by_id("c") else {
            log::warn!("no canvas element; tap collection disabled");
            return;
        };
        let app = app.clone();
        let canvas_clone = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
            let rect = canvas_clone.get_bounding_client_rect();
            if rect.width() <= 0.0 || rect.height() <= 0.0 {
                return;
            }
            let u = ((event.client_x() as f64 - rect.left()) / rect.width()) as f32;
            let v = ((event.client_y() as f64 - rect.top()) / rect.height()) as f32;

            let mut app = app.borrow_mut();
            if u.is_finite() && v.is_finite() {
                let picked = host_pick(u, v);
                let hit = (picked >= 0.0).then(|| PropId(picked as u32));
                app.input = FrameInput::tapped(hit);
            }
            app.audio.on_user_gesture();
        });
        let _ =
            canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Blocked playback retries on the first gesture of any kind, anywhere.
    fn setup_gesture_retry(app: &Rc<RefCell<App>>, window: &web_sys::Window) {
        for event_name in ["pointerdown", "touchstart", "mousedown", "keydown"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_: web_sys::Event| {
                app.borrow_mut().audio.on_user_gesture();
            });
            let _ =
                window.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(app: &Rc<RefCell<App>>, window: &web_sys::Window, document: &web_sys::Document) {
        let Some(canvas) = document.get_element_by_id("c") else {
            return;
        };
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_: web_sys::Event| {
            let rect = canvas.get_bounding_client_rect();
            app.borrow_mut()
                .presenter
                .resize(rect.width().max(1.0) as u32, rect.height().max(1.0) as u32);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use verse_trail::audio::AudioDirector;
    use verse_trail::presenter::{NullPresenter, SceneFrame, ScenePresenter};
    use verse_trail::script::{default_script, ScriptCue, ScriptPlayer};
    use verse_trail::settings::SceneSettings;
    use verse_trail::sim::{step, FrameInput, MotionMode, WorldState};
    use verse_trail::ui::{Hud, UiDirector};

    /// HUD that narrates to the log instead of a DOM.
    struct LogHud;

    impl Hud for LogHud {
        fn set_loading(&mut self, text: Option<&str>) {
            if let Some(text) = text {
                log::debug!("loader: {text}");
            }
        }
        fn set_verse(&mut self, reference: &str, line: &str) {
            log::info!("[{reference}] {line}");
        }
        fn set_sound_hint(&mut self, visible: bool) {
            log::debug!("sound hint: {visible}");
        }
        fn set_tap_hint(&mut self, visible: bool) {
            log::debug!("tap hint: {visible}");
        }
        fn set_counter_visible(&mut self, visible: bool) {
            log::debug!("counter visible: {visible}");
        }
        fn set_counter(&mut self, value: u32) {
            log::debug!("counter: {value}");
        }
        fn set_counter_bump(&mut self, _active: bool) {}
        fn set_combo(&mut self, multiplier: u32) {
            log::debug!("combo: x{multiplier}");
        }
        fn show_victory(&mut self) {
            log::info!("victory!");
        }
    }

    /// Drive the full scripted scene at 60 Hz with synthetic taps during the
    /// run phase, then report how it went.
    pub fn run() {
        let settings = SceneSettings::default();
        let counter_enabled = settings.counter_enabled;
        let mut world = WorldState::new(2026, settings);
        let mut player = ScriptPlayer::new(default_script());
        let mut audio = AudioDirector::new(false);
        let mut ui = UiDirector::new(counter_enabled);
        let mut hud = LogHud;
        let mut presenter = NullPresenter;

        let dt = 1.0 / 60.0;
        let mut since_tap = 0.0_f32;
        let mut frames = 0_u64;
        let mut tail = 8.0_f32;

        loop {
            frames += 1;

            let mut events = Vec::new();
            for cue in player.advance(dt) {
                match &cue {
                    ScriptCue::EnterWalk => world.set_mode(MotionMode::Walk, &mut events),
                    ScriptCue::EnterRun => world.set_mode(MotionMode::Run, &mut events),
                    ScriptCue::BeginAudio => audio.begin(),
                    ScriptCue::Finished => log::info!("script finished"),
                    ScriptCue::ShowText { .. } => {}
                }
                ui.handle_cue(&cue, &mut hud);
            }

            since_tap += dt;
            let input = if world.mode == Some(MotionMode::Run) && since_tap >= 0.4 {
                since_tap = 0.0;
                FrameInput::tapped(None)
            } else {
                FrameInput::default()
            };

            events.extend(step(&mut world, &input, dt));
            for event in &events {
                ui.handle_event(event, &mut hud);
            }
            audio.update();
            ui.sync_sound_hint(audio.hint_visible(), &mut hud);
            ui.update(dt, &mut hud);
            presenter.present(&SceneFrame::capture(&world));

            if player.is_finished() {
                tail -= dt;
                if tail <= 0.0 {
                    break;
                }
            }
        }

        log::info!(
            "headless run: {} frames, score {} / {}, celebrated: {}, {} props active",
            frames,
            world.score.total,
            world.score.target,
            world.score.celebrated(),
            world.meat.active_count(),
        );
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_scene::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Verse Trail (headless) starting...");
    headless::run();
}
