use std::collections::HashSet;
use std::rc::Rc;

use crate::cache::PreviewCache;
use crate::config::HoverTiming;
use crate::lookup::{LookupError, PreviewPayload};
use crate::sequencer::{RequestId, RequestSequencer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoverPhase {
    Idle,
    IntentPending,
    Displaying,
    Hiding,
}

/// Side effects requested by the controller. The host runs them in order.
///
/// Timer arms replace any timer of the same kind; at most one intent timer
/// and one hide timer exist at a time.
#[derive(Clone, Debug, PartialEq)]
pub enum HoverCommand<L> {
    ArmIntent { delay_ms: u32 },
    CancelIntent,
    ArmHide { delay_ms: u32 },
    CancelHide,
    Fetch { path: String, request: RequestId },
    Show { anchor: L },
    RenderLoading,
    RenderContent(Rc<PreviewPayload>),
    RenderError,
    Destroy,
}

#[derive(Debug)]
struct HoverSession<L> {
    link: L,
    /// Element the overlay is positioned against. For links inside the
    /// overlay this is the anchor the overlay already has.
    anchor: L,
    path: String,
    phase: HoverPhase,
    request: Option<RequestId>,
    /// Loading placeholder is up and no response has been rendered yet.
    awaiting: bool,
    from_overlay: bool,
    in_link: bool,
    in_overlay: bool,
}

enum LeaveOutcome {
    Nothing,
    StartHide,
    End,
}

/// Drives a single hover session at a time. `L` identifies a link element;
/// two links are the same only when they compare equal, even if they resolve
/// to the same path.
pub struct HoverController<L> {
    timing: HoverTiming,
    cache: PreviewCache,
    sequencer: RequestSequencer,
    session: Option<HoverSession<L>>,
    overlay_path: Option<String>,
    overlay_anchor: Option<L>,
    in_flight: HashSet<String>,
}

impl<L: Clone + PartialEq> HoverController<L> {
    pub fn new(timing: HoverTiming) -> Self {
        Self {
            timing,
            cache: PreviewCache::new(),
            sequencer: RequestSequencer::new(),
            session: None,
            overlay_path: None,
            overlay_anchor: None,
            in_flight: HashSet::new(),
        }
    }

    pub fn phase(&self) -> HoverPhase {
        self.session
            .as_ref()
            .map(|session| session.phase)
            .unwrap_or(HoverPhase::Idle)
    }

    pub fn active_link(&self) -> Option<&L> {
        self.session.as_ref().map(|session| &session.link)
    }

    pub fn active_path(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.path.as_str())
    }

    /// Path the overlay is showing (or loading), `None` while it is detached.
    pub fn overlay_path(&self) -> Option<&str> {
        self.overlay_path.as_deref()
    }

    pub fn cache(&self) -> &PreviewCache {
        &self.cache
    }

    pub fn timing(&self) -> HoverTiming {
        self.timing
    }

    /// Whether a lookup for `path` is outstanding.
    pub fn is_fetching(&self, path: &str) -> bool {
        self.in_flight.contains(path)
    }

    pub fn is_current(&self, request: RequestId) -> bool {
        self.sequencer.is_current(request)
            && self.session.as_ref().is_some_and(|session| {
                session.request == Some(request)
                    && matches!(session.phase, HoverPhase::Displaying | HoverPhase::Hiding)
            })
    }

    /// Whether a response for `path` issued as `request` may reach the
    /// overlay. Besides the current request, an older lookup for the exact
    /// path the overlay is still loading is accepted.
    pub fn accepts_response(&self, request: RequestId, path: &str) -> bool {
        if self.is_current(request) {
            return true;
        }
        self.overlay_path.as_deref() == Some(path)
            && self.session.as_ref().is_some_and(|session| {
                session.awaiting
                    && session.path == path
                    && matches!(session.phase, HoverPhase::Displaying | HoverPhase::Hiding)
            })
    }

    /// Pointer entered a qualifying link in the page content.
    pub fn pointer_enter_link(&mut self, link: L, path: String) -> Vec<HoverCommand<L>> {
        let mut commands = Vec::new();
        if self.reenter_active(&link, &mut commands) {
            return commands;
        }
        let was_in_overlay = self
            .session
            .as_ref()
            .is_some_and(|session| session.in_overlay);
        self.end_session(&mut commands);
        if self
            .overlay_path
            .as_deref()
            .is_some_and(|shown| shown != path)
        {
            self.overlay_path = None;
            self.overlay_anchor = None;
            commands.push(HoverCommand::Destroy);
        }
        let in_overlay = was_in_overlay && self.overlay_path.is_some();
        self.begin_session(link.clone(), link, path, false, in_overlay, &mut commands);
        commands
    }

    /// Pointer entered a qualifying link rendered inside the overlay. The
    /// overlay stays where it is; its content is replaced once intent elapses.
    pub fn pointer_enter_overlay_link(&mut self, link: L, path: String) -> Vec<HoverCommand<L>> {
        let Some(anchor) = self.overlay_anchor.clone() else {
            return self.pointer_enter_link(link, path);
        };
        let mut commands = Vec::new();
        if self.reenter_active(&link, &mut commands) {
            return commands;
        }
        self.end_session(&mut commands);
        self.begin_session(link, anchor, path, true, true, &mut commands);
        commands
    }

    pub fn pointer_leave_link(&mut self, link: &L) -> Vec<HoverCommand<L>> {
        let mut commands = Vec::new();
        let overlay_visible = self.overlay_path.is_some();
        let outcome = match self.session.as_mut() {
            Some(session) if session.link == *link => {
                session.in_link = false;
                match session.phase {
                    HoverPhase::IntentPending => {
                        commands.push(HoverCommand::CancelIntent);
                        if overlay_visible && !session.in_overlay {
                            LeaveOutcome::StartHide
                        } else if overlay_visible {
                            session.phase = HoverPhase::Displaying;
                            LeaveOutcome::Nothing
                        } else {
                            LeaveOutcome::End
                        }
                    }
                    HoverPhase::Displaying if !session.in_overlay => LeaveOutcome::StartHide,
                    _ => LeaveOutcome::Nothing,
                }
            }
            _ => LeaveOutcome::Nothing,
        };
        match outcome {
            LeaveOutcome::Nothing => {}
            LeaveOutcome::StartHide => self.start_hide(&mut commands),
            LeaveOutcome::End => {
                self.session = None;
                self.sequencer.retire();
            }
        }
        commands
    }

    pub fn pointer_enter_overlay(&mut self) -> Vec<HoverCommand<L>> {
        let mut commands = Vec::new();
        if self.overlay_path.is_none() {
            return commands;
        }
        if let Some(session) = self.session.as_mut() {
            session.in_overlay = true;
            if session.phase == HoverPhase::Hiding {
                session.phase = HoverPhase::Displaying;
                commands.push(HoverCommand::CancelHide);
            }
        }
        commands
    }

    pub fn pointer_leave_overlay(&mut self) -> Vec<HoverCommand<L>> {
        let mut commands = Vec::new();
        let should_hide = match self.session.as_mut() {
            Some(session) => {
                session.in_overlay = false;
                session.phase == HoverPhase::Displaying && !session.in_link
            }
            None => false,
        };
        if should_hide {
            self.start_hide(&mut commands);
        }
        commands
    }

    pub fn intent_elapsed(&mut self) -> Vec<HoverCommand<L>> {
        let mut commands = Vec::new();
        let Some(session) = self.session.as_mut() else {
            return commands;
        };
        if session.phase != HoverPhase::IntentPending {
            return commands;
        }
        let request = self.sequencer.next();
        session.request = Some(request);
        session.phase = HoverPhase::Displaying;
        // Rendering replaces the overlay content, and with it the link that
        // started a session from inside the overlay.
        if session.from_overlay {
            session.in_link = false;
        }
        self.overlay_path = Some(session.path.clone());
        self.overlay_anchor = Some(session.anchor.clone());
        commands.push(HoverCommand::Show {
            anchor: session.anchor.clone(),
        });
        match self.cache.get(&session.path) {
            Some(payload) => commands.push(HoverCommand::RenderContent(payload)),
            None => {
                session.awaiting = true;
                commands.push(HoverCommand::RenderLoading);
                if self.in_flight.insert(session.path.clone()) {
                    commands.push(HoverCommand::Fetch {
                        path: session.path.clone(),
                        request,
                    });
                }
            }
        }
        commands
    }

    pub fn hide_elapsed(&mut self) -> Vec<HoverCommand<L>> {
        let mut commands = Vec::new();
        let hiding = self
            .session
            .as_ref()
            .is_some_and(|session| session.phase == HoverPhase::Hiding);
        if !hiding {
            return commands;
        }
        self.session = None;
        self.sequencer.retire();
        self.overlay_anchor = None;
        if self.overlay_path.take().is_some() {
            commands.push(HoverCommand::Destroy);
        }
        commands
    }

    /// Successful payloads are cached whether or not they are still wanted;
    /// only an accepted response reaches the overlay.
    pub fn fetch_resolved(
        &mut self,
        request: RequestId,
        path: &str,
        outcome: Result<PreviewPayload, LookupError>,
    ) -> Vec<HoverCommand<L>> {
        self.in_flight.remove(path);
        let accepted = self.accepts_response(request, path);
        if accepted {
            if let Some(session) = self.session.as_mut() {
                session.awaiting = false;
            }
        }
        let mut commands = Vec::new();
        match outcome {
            Ok(payload) => {
                let payload = self.cache.put(path, payload);
                if accepted {
                    commands.push(HoverCommand::RenderContent(payload));
                }
            }
            Err(_) => {
                if accepted {
                    commands.push(HoverCommand::RenderError);
                }
            }
        }
        commands
    }

    /// Handles entering the link that is already active. Returns false when
    /// `link` is a different link.
    fn reenter_active(&mut self, link: &L, commands: &mut Vec<HoverCommand<L>>) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.link != *link {
            return false;
        }
        session.in_link = true;
        if session.phase == HoverPhase::Hiding {
            commands.push(HoverCommand::CancelHide);
            if session.request.is_some() {
                session.phase = HoverPhase::Displaying;
            } else {
                session.phase = HoverPhase::IntentPending;
                commands.push(HoverCommand::ArmIntent {
                    delay_ms: self.timing.intent_delay_ms,
                });
            }
        }
        true
    }

    fn begin_session(
        &mut self,
        link: L,
        anchor: L,
        path: String,
        from_overlay: bool,
        in_overlay: bool,
        commands: &mut Vec<HoverCommand<L>>,
    ) {
        self.session = Some(HoverSession {
            link,
            anchor,
            path,
            phase: HoverPhase::IntentPending,
            request: None,
            awaiting: false,
            from_overlay,
            in_link: true,
            in_overlay,
        });
        commands.push(HoverCommand::ArmIntent {
            delay_ms: self.timing.intent_delay_ms,
        });
    }

    fn start_hide(&mut self, commands: &mut Vec<HoverCommand<L>>) {
        if let Some(session) = self.session.as_mut() {
            session.phase = HoverPhase::Hiding;
            commands.push(HoverCommand::ArmHide {
                delay_ms: self.timing.hide_delay_ms,
            });
        }
    }

    fn end_session(&mut self, commands: &mut Vec<HoverCommand<L>>) {
        let Some(session) = self.session.take() else {
            return;
        };
        match session.phase {
            HoverPhase::IntentPending => commands.push(HoverCommand::CancelIntent),
            HoverPhase::Hiding => commands.push(HoverCommand::CancelHide),
            HoverPhase::Displaying | HoverPhase::Idle => {}
        }
        self.sequencer.retire();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> HoverController<u32> {
        HoverController::new(HoverTiming::default())
    }

    #[test]
    fn enter_arms_intent_only() {
        let mut hover = controller();
        let commands = hover.pointer_enter_link(1, "a".to_string());
        assert_eq!(commands, vec![HoverCommand::ArmIntent { delay_ms: 500 }]);
        assert_eq!(hover.phase(), HoverPhase::IntentPending);
        assert_eq!(hover.active_path(), Some("a"));
    }

    #[test]
    fn stray_timers_are_ignored() {
        let mut hover = controller();
        assert!(hover.intent_elapsed().is_empty());
        assert!(hover.hide_elapsed().is_empty());
        hover.pointer_enter_link(1, "a".to_string());
        assert!(hover.hide_elapsed().is_empty());
        assert_eq!(hover.phase(), HoverPhase::IntentPending);
    }

    #[test]
    fn leaving_before_intent_ends_session() {
        let mut hover = controller();
        hover.pointer_enter_link(1, "a".to_string());
        let commands = hover.pointer_leave_link(&1);
        assert_eq!(commands, vec![HoverCommand::CancelIntent]);
        assert_eq!(hover.phase(), HoverPhase::Idle);
        assert!(hover.intent_elapsed().is_empty());
    }

    #[test]
    fn leaving_other_link_is_ignored() {
        let mut hover = controller();
        hover.pointer_enter_link(1, "a".to_string());
        assert!(hover.pointer_leave_link(&2).is_empty());
        assert_eq!(hover.phase(), HoverPhase::IntentPending);
    }

    #[test]
    fn overlay_link_keeps_overlay_and_anchor() {
        let mut hover = controller();
        hover.pointer_enter_link(1, "a".to_string());
        hover.intent_elapsed();
        hover.pointer_enter_overlay();
        let commands = hover.pointer_enter_overlay_link(2, "b".to_string());
        assert_eq!(commands, vec![HoverCommand::ArmIntent { delay_ms: 500 }]);
        assert_eq!(hover.overlay_path(), Some("a"));

        let commands = hover.intent_elapsed();
        assert_eq!(commands[0], HoverCommand::Show { anchor: 1 });
        assert_eq!(hover.overlay_path(), Some("b"));
        assert_eq!(
            hover.pointer_leave_overlay(),
            vec![HoverCommand::ArmHide { delay_ms: 300 }]
        );
    }

    #[test]
    fn overlay_link_without_overlay_acts_like_page_link() {
        let mut hover = controller();
        let commands = hover.pointer_enter_overlay_link(2, "b".to_string());
        assert_eq!(commands, vec![HoverCommand::ArmIntent { delay_ms: 500 }]);
        hover.intent_elapsed();
        assert_eq!(hover.pointer_leave_link(&2), vec![HoverCommand::ArmHide { delay_ms: 300 }]);
    }

    #[test]
    fn lookup_error_renders_error_state() {
        let mut hover = controller();
        hover.pointer_enter_link(1, "a".to_string());
        let commands = hover.intent_elapsed();
        let request = commands
            .iter()
            .find_map(|command| match command {
                HoverCommand::Fetch { request, .. } => Some(*request),
                _ => None,
            })
            .expect("fetch issued");
        let commands = hover.fetch_resolved(request, "a", Err(LookupError::Status(404)));
        assert_eq!(commands, vec![HoverCommand::RenderError]);
        assert_eq!(hover.phase(), HoverPhase::Displaying);
        assert!(!hover.cache().contains("a"));
    }
}
