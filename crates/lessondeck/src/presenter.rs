//! Slide navigation: which slide is on screen, the animated swap between
//! slides, and the completion hand-off back to the caller.
//!
//! Time only enters through [`Presenter::tick`], so the whole state machine
//! runs the same under the eframe loop and in tests.

use std::sync::Arc;

use tracing::debug;

use crate::deck::{Deck, Slide};
use crate::render::transition::{
    SLIDE_SHIFT, TransitionDirection, TransitionKind, TransitionSettings, ease_in_out,
};
use crate::tooltip::TooltipOverlay;

/// Called once when the learner steps past the last slide.
pub type OnComplete = Box<dyn FnOnce()>;

/// Host input that must be suspended while slides are on screen.
pub trait InputBlocker {
    fn set_blocked(&mut self, blocked: bool);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterState {
    Idle,
    Showing(usize),
    Transitioning { from: usize, to: usize },
}

/// Keyboard navigation, armed once per rendered slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Next,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Out,
    In,
}

#[derive(Debug, Clone, Copy)]
struct Tween {
    from: usize,
    to: usize,
    direction: TransitionDirection,
    phase: Phase,
    elapsed: f32,
}

/// The rendered state of the slide on screen. Rebuilt from scratch on every
/// content swap; `generation` identifies each rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideView {
    pub index: usize,
    pub generation: u64,
    pub tooltip: TooltipOverlay,
}

pub struct Presenter {
    settings: TransitionSettings,
    deck: Option<Arc<Deck>>,
    last_deck: Option<Arc<Deck>>,
    on_complete: Option<OnComplete>,
    blocker: Option<Box<dyn InputBlocker>>,
    view: Option<SlideView>,
    tween: Option<Tween>,
    generation: u64,
    keys_armed: bool,
}

impl Presenter {
    pub fn new(settings: TransitionSettings) -> Self {
        Self {
            settings,
            deck: None,
            last_deck: None,
            on_complete: None,
            blocker: None,
            view: None,
            tween: None,
            generation: 0,
            keys_armed: false,
        }
    }

    pub fn settings(&self) -> TransitionSettings {
        self.settings
    }

    pub fn set_transition_kind(&mut self, kind: TransitionKind) {
        self.settings.kind = kind;
    }

    /// Begin presenting `deck` from its first slide.
    ///
    /// An empty deck completes immediately without showing anything. Showing
    /// while another session is active replaces it; the old session's
    /// completion callback is dropped without being called.
    pub fn show(
        &mut self,
        deck: Arc<Deck>,
        on_complete: Option<OnComplete>,
        blocker: Option<Box<dyn InputBlocker>>,
    ) {
        if self.deck.is_some() {
            debug!("replacing active slide session");
            self.teardown();
        }
        self.blocker = blocker;
        self.start(deck, on_complete);
    }

    /// Show the most recently presented deck again from slide 0, keeping the
    /// current input blocker. Only possible while idle.
    pub fn reopen(&mut self) -> bool {
        self.reopen_with(None)
    }

    /// Like [`Presenter::reopen`], with a fresh completion callback.
    pub fn reopen_with(&mut self, on_complete: Option<OnComplete>) -> bool {
        if self.deck.is_some() {
            return false;
        }
        match self.last_deck.clone() {
            Some(deck) => {
                debug!(completes = on_complete.is_some(), "reopening last deck");
                self.start(deck, on_complete);
                true
            }
            None => false,
        }
    }

    fn start(&mut self, deck: Arc<Deck>, on_complete: Option<OnComplete>) {
        if deck.is_empty() {
            debug!("empty deck, completing immediately");
            if let Some(callback) = on_complete {
                callback();
            }
            return;
        }

        debug!(slides = deck.len(), "showing deck");
        self.last_deck = Some(Arc::clone(&deck));
        self.deck = Some(deck);
        self.on_complete = on_complete;
        self.set_blocked(true);
        self.render(0);
    }

    /// Show slide `index` (clamped to the deck) immediately, without a
    /// transition.
    pub fn jump_to(&mut self, index: usize) -> bool {
        let Some(len) = self.deck.as_ref().map(|d| d.len()) else {
            return false;
        };
        self.tween = None;
        self.render(index.min(len - 1));
        true
    }

    /// Dismiss the session without completing it.
    pub fn hide(&mut self) {
        if self.deck.is_some() {
            debug!("hiding slides");
            self.teardown();
        }
    }

    pub fn is_showing(&self) -> bool {
        self.deck.is_some()
    }

    pub fn is_transitioning(&self) -> bool {
        self.tween.is_some()
    }

    pub fn state(&self) -> PresenterState {
        match (&self.view, &self.tween) {
            (_, Some(t)) => PresenterState::Transitioning {
                from: t.from,
                to: t.to,
            },
            (Some(view), None) => PresenterState::Showing(view.index),
            (None, None) => PresenterState::Idle,
        }
    }

    pub fn deck(&self) -> Option<&Arc<Deck>> {
        self.deck.as_ref()
    }

    pub fn view(&self) -> Option<&SlideView> {
        self.view.as_ref()
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        let deck = self.deck.as_ref()?;
        let view = self.view.as_ref()?;
        deck.slides.get(view.index)
    }

    /// Advance one slide, or complete the deck from the last slide.
    /// Returns false when nothing happened.
    pub fn next(&mut self) -> bool {
        let Some(len) = self.deck.as_ref().map(|d| d.len()) else {
            return false;
        };
        let Some(base) = self.destination() else {
            return false;
        };
        if base + 1 >= len {
            self.finish();
        } else {
            self.go_to(base + 1, TransitionDirection::Forward);
        }
        true
    }

    /// Go back one slide. A no-op on the first slide.
    pub fn back(&mut self) -> bool {
        match self.destination() {
            Some(base) if base > 0 => {
                self.go_to(base - 1, TransitionDirection::Backward);
                true
            }
            Some(_) => {
                debug!("back ignored on first slide");
                false
            }
            None => false,
        }
    }

    /// Keyboard navigation. Each binding fires once and is re-armed when the
    /// next slide has been rendered.
    pub fn key(&mut self, key: NavKey) -> bool {
        if !self.keys_armed {
            return false;
        }
        self.keys_armed = false;
        let moved = match key {
            NavKey::Next => self.next(),
            NavKey::Back => self.back(),
        };
        if !moved {
            self.keys_armed = true;
        }
        moved
    }

    pub fn keys_armed(&self) -> bool {
        self.keys_armed
    }

    /// Route the tooltip trigger under the pointer to the slide's overlay.
    /// Ignored while slides are swapping.
    pub fn hover(&mut self, trigger: Option<usize>) {
        if self.tween.is_some() {
            return;
        }
        if let Some(view) = self.view.as_mut() {
            view.tooltip.sync_hover(trigger);
        }
    }

    /// Advance animations by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if let Some(view) = self.view.as_mut() {
            view.tooltip.advance(dt);
        }

        let Some(mut tween) = self.tween else {
            return;
        };
        let half = self.settings.half_duration;
        tween.elapsed += dt;

        if tween.phase == Phase::Out && tween.elapsed >= half {
            let overshoot = tween.elapsed - half;
            self.render(tween.to);
            tween.phase = Phase::In;
            tween.elapsed = overshoot;
        }

        if tween.phase == Phase::In && tween.elapsed >= half {
            self.tween = None;
        } else {
            self.tween = Some(tween);
        }
    }

    /// Opacity of the whole slide container.
    pub fn container_alpha(&self) -> f32 {
        match self.tween {
            None => 1.0,
            Some(t) => {
                let p = self.phase_progress(&t);
                match t.phase {
                    Phase::Out => 1.0 - p,
                    Phase::In => p,
                }
            }
        }
    }

    /// Horizontal offset of the slide container in canvas units.
    pub fn container_offset(&self) -> f32 {
        match (self.tween, self.settings.kind) {
            (Some(t), TransitionKind::Slide) => {
                let p = self.phase_progress(&t);
                let sign = t.direction.sign();
                match t.phase {
                    Phase::Out => -sign * SLIDE_SHIFT * p,
                    Phase::In => sign * SLIDE_SHIFT * (1.0 - p),
                }
            }
            _ => 0.0,
        }
    }

    pub fn indicator(&self) -> Option<String> {
        let deck = self.deck.as_ref()?;
        let view = self.view.as_ref()?;
        Some(format!("{} / {}", view.index + 1, deck.len()))
    }

    pub fn next_label(&self) -> &'static str {
        match (&self.deck, &self.view) {
            (Some(deck), Some(view)) if view.index + 1 >= deck.len() => "Start",
            _ => "Next",
        }
    }

    pub fn back_enabled(&self) -> bool {
        self.view.as_ref().is_some_and(|v| v.index > 0)
    }

    fn phase_progress(&self, tween: &Tween) -> f32 {
        let half = self.settings.half_duration;
        if half <= 0.0 {
            return 1.0;
        }
        ease_in_out((tween.elapsed / half).clamp(0.0, 1.0))
    }

    /// Where navigation is heading: the pending target, else the slide shown.
    fn destination(&self) -> Option<usize> {
        self.tween
            .map(|t| t.to)
            .or_else(|| self.view.as_ref().map(|v| v.index))
    }

    fn go_to(&mut self, target: usize, direction: TransitionDirection) {
        debug!(target, ?direction, "navigating");
        if self.settings.kind == TransitionKind::None {
            self.tween = None;
            self.render(target);
            return;
        }

        let Some(view) = self.view.as_mut() else {
            return;
        };
        // Hover is ignored until the swap settles; drop any open panel now.
        view.tooltip.close_now();
        let shown = view.index;
        // Stop any running tween first, then fade out from wherever the
        // container currently is.
        let elapsed = match self.tween.take() {
            None => 0.0,
            Some(prev) => match prev.phase {
                Phase::Out => prev.elapsed,
                Phase::In => (self.settings.half_duration - prev.elapsed).max(0.0),
            },
        };
        self.tween = Some(Tween {
            from: shown,
            to: target,
            direction,
            phase: Phase::Out,
            elapsed,
        });
    }

    /// Replace the rendered slide with a fresh view of `index`.
    fn render(&mut self, index: usize) {
        self.generation += 1;
        self.view = Some(SlideView {
            index,
            generation: self.generation,
            tooltip: TooltipOverlay::default(),
        });
        self.keys_armed = true;
    }

    fn finish(&mut self) {
        debug!("deck complete");
        let callback = self.on_complete.take();
        self.teardown();
        if let Some(callback) = callback {
            callback();
        }
    }

    fn teardown(&mut self) {
        self.tween = None;
        self.view = None;
        self.deck = None;
        self.on_complete = None;
        self.keys_armed = false;
        self.set_blocked(false);
    }

    fn set_blocked(&mut self, blocked: bool) {
        if let Some(blocker) = self.blocker.as_mut() {
            blocker.set_blocked(blocked);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Element;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FlagBlocker(Rc<Cell<bool>>);

    impl InputBlocker for FlagBlocker {
        fn set_blocked(&mut self, blocked: bool) {
            self.0.set(blocked);
        }
    }

    fn deck_of(n: usize) -> Arc<Deck> {
        let slides = (0..n)
            .map(|i| Slide {
                title: format!("Slide {}", i + 1),
                elements: vec![Element::Title {
                    text: format!("S{i}"),
                }],
                background_color: None,
            })
            .collect();
        Arc::new(Deck {
            title: None,
            level: None,
            slides,
        })
    }

    fn counter() -> (Rc<Cell<u32>>, OnComplete) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, Box::new(move || c.set(c.get() + 1)))
    }

    fn presenter(kind: TransitionKind) -> Presenter {
        Presenter::new(TransitionSettings {
            kind,
            half_duration: 0.2,
        })
    }

    fn settle(p: &mut Presenter) {
        for _ in 0..10 {
            p.tick(0.1);
        }
    }

    #[test]
    fn test_example_two_slide_deck() {
        let deck = Arc::new(
            Deck::from_yaml(
                "slides:\n  - title: A\n    elements:\n      - {type: title, text: A}\n  - title: B\n    elements:\n      - {type: paragraph, text: B body}\n",
            )
            .unwrap(),
        );
        let (count, cb) = counter();
        let mut p = presenter(TransitionKind::Slide);
        p.show(deck, Some(cb), None);
        assert_eq!(p.state(), PresenterState::Showing(0));
        assert_eq!(p.indicator().as_deref(), Some("1 / 2"));
        assert_eq!(p.next_label(), "Next");

        assert!(p.next());
        settle(&mut p);
        assert_eq!(p.state(), PresenterState::Showing(1));
        assert_eq!(p.indicator().as_deref(), Some("2 / 2"));
        assert_eq!(p.next_label(), "Start");
        assert_eq!(p.current_slide().unwrap().title, "B");
        assert_eq!(count.get(), 0);

        assert!(p.next());
        assert_eq!(count.get(), 1);
        assert_eq!(p.state(), PresenterState::Idle);
        assert!(!p.is_showing());
        assert!(!p.next());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_empty_deck_completes_synchronously() {
        let flag = Rc::new(Cell::new(false));
        let (count, cb) = counter();
        let mut p = presenter(TransitionKind::Slide);
        p.show(deck_of(0), Some(cb), Some(Box::new(FlagBlocker(Rc::clone(&flag)))));
        assert_eq!(count.get(), 1);
        assert!(!p.is_showing());
        assert!(p.view().is_none());
        assert!(!flag.get());
        assert!(!p.reopen());
    }

    #[test]
    fn test_back_is_noop_on_first_slide() {
        let mut p = presenter(TransitionKind::Slide);
        p.show(deck_of(3), None, None);
        let generation = p.view().unwrap().generation;
        assert!(!p.back());
        assert!(!p.is_transitioning());
        assert_eq!(p.view().unwrap().generation, generation);
        assert!(!p.back_enabled());
    }

    #[test]
    fn test_next_back_are_inverses() {
        let mut p = presenter(TransitionKind::Fade);
        p.show(deck_of(4), None, None);
        p.next();
        settle(&mut p);
        assert_eq!(p.state(), PresenterState::Showing(1));
        let before = p.view().unwrap().clone();

        p.next();
        settle(&mut p);
        p.back();
        settle(&mut p);

        let after = p.view().unwrap();
        assert_eq!(after.index, before.index);
        assert!(after.generation > before.generation);
        assert_eq!(after.tooltip, before.tooltip);
        assert_eq!(p.current_slide().unwrap().title, "Slide 2");
    }

    #[test]
    fn test_retarget_mid_transition_renders_latest() {
        let mut p = presenter(TransitionKind::Slide);
        p.show(deck_of(5), None, None);
        p.next();
        p.tick(0.05);
        p.next();
        assert_eq!(p.state(), PresenterState::Transitioning { from: 0, to: 2 });
        p.tick(0.05);
        p.next();
        assert_eq!(p.state(), PresenterState::Transitioning { from: 0, to: 3 });

        settle(&mut p);
        assert_eq!(p.state(), PresenterState::Showing(3));
        assert_relative_eq!(p.container_alpha(), 1.0);
        assert_relative_eq!(p.container_offset(), 0.0);
    }

    #[test]
    fn test_retarget_after_swap_fades_out_new_content() {
        let mut p = presenter(TransitionKind::Slide);
        p.show(deck_of(3), None, None);
        p.next();
        p.tick(0.25);
        assert_eq!(p.view().unwrap().index, 1);
        assert!(p.is_transitioning());

        let alpha = p.container_alpha();
        p.back();
        assert_eq!(p.state(), PresenterState::Transitioning { from: 1, to: 0 });
        assert_relative_eq!(p.container_alpha(), alpha, epsilon = 1e-4);

        settle(&mut p);
        assert_eq!(p.state(), PresenterState::Showing(0));
    }

    #[test]
    fn test_only_one_view_during_transitions() {
        let (count, cb) = counter();
        let mut p = presenter(TransitionKind::Slide);
        p.show(deck_of(20), Some(cb), None);
        let mut target = 0;
        for step in 0..40 {
            if step % 3 == 0 {
                assert!(p.next());
                target += 1;
            }
            p.tick(0.03);
            if let PresenterState::Transitioning { from, to } = p.state() {
                let shown = p.view().unwrap().index;
                assert!(shown == from || shown == to);
                assert_eq!(to, target);
            }
        }
        settle(&mut p);
        assert_eq!(p.state(), PresenterState::Showing(target));
        assert_eq!(p.view().unwrap().index, target);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_next_on_last_slide_mid_transition_completes() {
        let (count, cb) = counter();
        let mut p = presenter(TransitionKind::Slide);
        p.show(deck_of(2), Some(cb), None);
        p.next();
        p.tick(0.05);
        p.next();
        assert_eq!(count.get(), 1);
        assert_eq!(p.state(), PresenterState::Idle);
    }

    #[test]
    fn test_no_transition_swaps_immediately() {
        let mut p = presenter(TransitionKind::None);
        p.show(deck_of(3), None, None);
        p.next();
        assert_eq!(p.state(), PresenterState::Showing(1));
        assert!(p.keys_armed());
    }

    #[test]
    fn test_jump_to_clamps() {
        let mut p = presenter(TransitionKind::Slide);
        assert!(!p.jump_to(1));
        p.show(deck_of(3), None, None);
        assert!(p.jump_to(9));
        assert_eq!(p.state(), PresenterState::Showing(2));
        assert_eq!(p.next_label(), "Start");
        assert!(p.back_enabled());
    }

    #[test]
    fn test_keys_fire_once_per_render() {
        let mut p = presenter(TransitionKind::Slide);
        p.show(deck_of(4), None, None);
        assert!(p.key(NavKey::Next));
        assert!(!p.key(NavKey::Next));
        assert_eq!(p.state(), PresenterState::Transitioning { from: 0, to: 1 });

        settle(&mut p);
        assert!(p.key(NavKey::Next));
        settle(&mut p);
        assert_eq!(p.state(), PresenterState::Showing(2));
    }

    #[test]
    fn test_noop_key_stays_armed() {
        let mut p = presenter(TransitionKind::Slide);
        p.show(deck_of(2), None, None);
        assert!(!p.key(NavKey::Back));
        assert!(p.keys_armed());
        assert!(p.key(NavKey::Next));
    }

    #[test]
    fn test_blocker_follows_session() {
        let flag = Rc::new(Cell::new(false));
        let mut p = presenter(TransitionKind::Slide);
        p.show(
            deck_of(1),
            None,
            Some(Box::new(FlagBlocker(Rc::clone(&flag)))),
        );
        assert!(flag.get());
        p.next();
        assert!(!flag.get());

        assert!(p.reopen());
        assert!(flag.get());
        p.hide();
        assert!(!flag.get());
    }

    #[test]
    fn test_hide_does_not_complete() {
        let (count, cb) = counter();
        let mut p = presenter(TransitionKind::Slide);
        p.show(deck_of(3), Some(cb), None);
        p.hide();
        assert_eq!(count.get(), 0);
        assert!(!p.is_showing());
        assert!(p.view().is_none());
    }

    #[test]
    fn test_reopen_after_completion() {
        let (count, cb) = counter();
        let mut p = presenter(TransitionKind::Slide);
        p.show(deck_of(2), Some(cb), None);
        assert!(!p.reopen());
        p.next();
        settle(&mut p);
        p.next();
        assert_eq!(count.get(), 1);

        assert!(p.reopen());
        assert_eq!(p.state(), PresenterState::Showing(0));
        p.next();
        settle(&mut p);
        p.next();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_reopen_with_callback_after_hide() {
        let (first, cb1) = counter();
        let (second, cb2) = counter();
        let mut p = presenter(TransitionKind::None);
        p.show(deck_of(2), Some(cb1), None);
        p.hide();
        assert!(p.reopen_with(Some(cb2)));
        assert_eq!(p.state(), PresenterState::Showing(0));
        p.next();
        p.next();
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
        assert!(!p.is_showing());
    }

    #[test]
    fn test_show_replaces_session_without_completing() {
        let (first, cb1) = counter();
        let (second, cb2) = counter();
        let mut p = presenter(TransitionKind::Slide);
        p.show(deck_of(3), Some(cb1), None);
        p.next();
        p.show(deck_of(1), Some(cb2), None);
        assert_eq!(p.state(), PresenterState::Showing(0));
        p.next();
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn test_hover_ignored_while_transitioning() {
        let mut p = presenter(TransitionKind::Slide);
        p.show(deck_of(3), None, None);
        p.hover(Some(0));
        assert!(p.view().unwrap().tooltip.is_open());

        p.next();
        assert!(!p.view().unwrap().tooltip.is_visible());
        p.hover(Some(0));
        p.tick(0.25);
        assert!(!p.view().unwrap().tooltip.is_visible());
        p.hover(Some(0));
        assert!(!p.view().unwrap().tooltip.is_open());
    }

    #[test]
    fn test_container_animation_shape() {
        let mut p = presenter(TransitionKind::Slide);
        p.show(deck_of(2), None, None);
        p.next();
        p.tick(0.1);
        assert!(p.container_alpha() < 1.0);
        assert!(p.container_offset() < 0.0);
        p.tick(0.15);
        assert!(p.container_offset() > 0.0);
        settle(&mut p);
        assert_relative_eq!(p.container_alpha(), 1.0);
    }

    proptest! {
        #[test]
        fn prop_completion_fires_exactly_once(n in 1usize..8, kind in 0u8..3, dt in 0.0f32..0.3) {
            let kind = match kind {
                0 => TransitionKind::Slide,
                1 => TransitionKind::Fade,
                _ => TransitionKind::None,
            };
            let (count, cb) = counter();
            let mut p = presenter(kind);
            p.show(deck_of(n), Some(cb), None);
            for _ in 0..n - 1 {
                p.next();
                p.tick(dt);
                prop_assert_eq!(count.get(), 0);
            }
            p.next();
            prop_assert_eq!(count.get(), 1);
            prop_assert!(!p.is_showing());
            p.next();
            p.tick(1.0);
            prop_assert_eq!(count.get(), 1);
        }
    }
}
