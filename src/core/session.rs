//! Voice capture session: one listen/interpret attempt at a time.
//!
//! Every asynchronous input (recognizer callbacks, the timeout timer, the
//! interpretation reply) arrives as a [`SessionEvent`] tagged with the token
//! it was armed under. [`transition`] is a pure function deciding the next
//! state and the effects to run; [`VoiceSessionController`] owns the live
//! resources and executes those effects.

use crate::core::matcher::MenuMatcher;
use crate::core::order::OrderAggregator;
use crate::domain::model::{InterpretationResult, SessionState, SessionToken};
use crate::domain::ports::{
    EventReceiver, EventSender, Feedback, SessionEvent, SpeechRecognizer, TranscriptInterpreter,
};
use crate::utils::error::{KioskError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Spoken phrases. Defaults are the Korean prompts used on the kiosk floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub listening: String,
    /// Prefix; the raw transcript is appended.
    pub confirmation: String,
    pub apology: String,
    pub recognition_failed: String,
    pub session_ended: String,
    pub start_failed: String,
    /// `{name}` and `{quantity}` are substituted.
    pub item_added: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            listening: "무엇을 주문하시겠어요?".to_string(),
            confirmation: "주문이 추가되었습니다.".to_string(),
            apology: "죄송합니다. 다시 말씀해주세요.".to_string(),
            recognition_failed: "음성 인식에 실패했습니다. 다시 시도해주세요.".to_string(),
            session_ended: "음성 인식이 종료되었습니다.".to_string(),
            start_failed: "음성 인식을 시작할 수 없습니다.".to_string(),
            item_added: "{name} {quantity}개를 주문에 추가했습니다.".to_string(),
        }
    }
}

impl Prompts {
    pub fn render(&self, utterance: &Utterance) -> String {
        match utterance {
            Utterance::Listening => self.listening.clone(),
            Utterance::Confirmation(transcript) => format!("{} {}", self.confirmation, transcript),
            Utterance::Apology => self.apology.clone(),
            Utterance::RecognitionFailed => self.recognition_failed.clone(),
            Utterance::SessionEnded => self.session_ended.clone(),
            Utterance::StartFailed => self.start_failed.clone(),
        }
    }

    pub fn item_added(&self, name: &str, quantity: u32) -> String {
        self.item_added
            .replace("{name}", name)
            .replace("{quantity}", &quantity.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Utterance {
    Listening,
    Confirmation(String),
    Apology,
    RecognitionFailed,
    SessionEnded,
    StartFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub state: SessionState,
    pub token: SessionToken,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            token: SessionToken::default(),
        }
    }
}

#[derive(Debug)]
pub enum Input<'a> {
    Start,
    Stop,
    Event(&'a SessionEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CancelTimeout,
    StopRecognizer,
    StartRecognizer,
    ArmTimeout,
    Announce(Utterance),
    Interpret(String),
    ApplyOrder(InterpretationResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Applied,
    /// Token no longer current.
    Stale,
    /// Token current but the event does not apply in this state.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub session: Session,
    pub effects: Vec<Effect>,
    pub disposition: Disposition,
}

impl Transition {
    fn unchanged(session: Session, disposition: Disposition) -> Self {
        Self {
            session,
            effects: Vec::new(),
            disposition,
        }
    }

    fn to(session: Session, state: SessionState, effects: Vec<Effect>) -> Self {
        Self {
            session: Session { state, ..session },
            effects,
            disposition: Disposition::Applied,
        }
    }
}

pub fn transition(session: Session, input: &Input<'_>) -> Transition {
    use SessionState::{Listening, Processing, Terminated};

    let event = match input {
        Input::Start => {
            let mut effects = Vec::new();
            if session.state.is_active() {
                effects.push(Effect::CancelTimeout);
                effects.push(Effect::StopRecognizer);
            }
            effects.extend([
                Effect::StartRecognizer,
                Effect::Announce(Utterance::Listening),
                Effect::ArmTimeout,
            ]);
            return Transition {
                session: Session {
                    state: Listening,
                    token: session.token.next(),
                },
                effects,
                disposition: Disposition::Applied,
            };
        }
        Input::Stop => {
            if !session.state.is_active() {
                return Transition::unchanged(session, Disposition::Ignored);
            }
            return Transition::to(
                session,
                Terminated,
                vec![Effect::CancelTimeout, Effect::StopRecognizer],
            );
        }
        Input::Event(event) => *event,
    };

    if event.token() != session.token {
        return Transition::unchanged(session, Disposition::Stale);
    }

    match (session.state, event) {
        (Listening, SessionEvent::RecognitionResult { transcript, .. }) => Transition::to(
            session,
            Processing,
            vec![Effect::CancelTimeout, Effect::Interpret(transcript.clone())],
        ),
        (Listening, SessionEvent::RecognitionError { .. }) => Transition::to(
            session,
            Terminated,
            vec![
                Effect::CancelTimeout,
                Effect::Announce(Utterance::RecognitionFailed),
                Effect::StopRecognizer,
            ],
        ),
        (Listening, SessionEvent::RecognitionEnded { .. }) => Transition::to(
            session,
            Terminated,
            vec![Effect::CancelTimeout, Effect::StopRecognizer],
        ),
        (Listening, SessionEvent::Timeout { .. }) => Transition::to(
            session,
            Terminated,
            vec![
                Effect::CancelTimeout,
                Effect::Announce(Utterance::SessionEnded),
                Effect::StopRecognizer,
            ],
        ),
        (
            Processing,
            SessionEvent::Interpreted {
                transcript,
                outcome,
                ..
            },
        ) => {
            let mut effects = match outcome {
                Ok(result) => vec![
                    Effect::ApplyOrder(result.clone()),
                    Effect::Announce(Utterance::Confirmation(transcript.clone())),
                ],
                Err(_) => vec![Effect::Announce(Utterance::Apology)],
            };
            effects.push(Effect::StopRecognizer);
            Transition::to(session, Terminated, effects)
        }
        _ => Transition::unchanged(session, Disposition::Ignored),
    }
}

/// Drives the host recognizer, the timeout timer and the interpretation call
/// for one session at a time.
pub struct VoiceSessionController {
    session: Session,
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    recognizer_active: bool,
    interpreter: Arc<dyn TranscriptInterpreter>,
    matcher: MenuMatcher,
    feedback: Arc<dyn Feedback>,
    prompts: Prompts,
    timeout: Duration,
    timeout_handle: Option<JoinHandle<()>>,
    events: EventSender,
}

impl VoiceSessionController {
    /// Pass `None` as the recognizer when the device has no speech capability.
    pub fn new(
        recognizer: Option<Box<dyn SpeechRecognizer>>,
        interpreter: Arc<dyn TranscriptInterpreter>,
        matcher: MenuMatcher,
        feedback: Arc<dyn Feedback>,
    ) -> (Self, EventReceiver) {
        let (events, receiver) = mpsc::unbounded_channel();
        let controller = Self {
            session: Session::default(),
            recognizer,
            recognizer_active: false,
            interpreter,
            matcher,
            feedback,
            prompts: Prompts::default(),
            timeout: DEFAULT_TIMEOUT,
            timeout_handle: None,
            events,
        };
        (controller, receiver)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn token(&self) -> SessionToken {
        self.session.token
    }

    pub fn is_supported(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn has_armed_timeout(&self) -> bool {
        self.timeout_handle.is_some()
    }

    pub fn is_recognizer_active(&self) -> bool {
        self.recognizer_active
    }

    pub fn prompts(&self) -> &Prompts {
        &self.prompts
    }

    /// Sender for host callbacks that are not wired through the recognizer.
    pub fn event_sender(&self) -> EventSender {
        self.events.clone()
    }

    pub fn start(&mut self) -> Result<SessionToken> {
        if self.recognizer.is_none() {
            tracing::warn!("Voice session requested but speech recognition is unavailable");
            return Err(KioskError::UnsupportedDevice);
        }

        let step = transition(self.session, &Input::Start);
        let previous = self.session.token;
        self.session = step.session;
        tracing::info!(
            "Voice session {} started (previous {})",
            self.session.token,
            previous
        );

        for effect in step.effects {
            if effect == Effect::StartRecognizer {
                if let Err(e) = self.start_recognizer() {
                    tracing::error!("Failed to start recognition: {}", e);
                    self.cancel_timeout();
                    self.stop_recognizer();
                    self.announce(&Utterance::StartFailed);
                    self.session.state = SessionState::Idle;
                    return Err(e);
                }
                continue;
            }
            self.run_effect(effect, None);
        }
        Ok(self.session.token)
    }

    /// Silent manual stop.
    pub fn stop(&mut self) {
        let step = transition(self.session, &Input::Stop);
        if step.disposition != Disposition::Applied {
            return;
        }
        tracing::info!("Voice session {} stopped manually", self.session.token);
        self.apply(step, None);
    }

    pub fn handle(&mut self, event: SessionEvent, order: &mut OrderAggregator) {
        let step = transition(self.session, &Input::Event(&event));
        match step.disposition {
            Disposition::Stale => {
                tracing::debug!(
                    "Discarding stale {} for session {} (current {})",
                    event.name(),
                    event.token(),
                    self.session.token
                );
            }
            Disposition::Ignored => {
                tracing::debug!(
                    "Ignoring {} for session {} in state {:?}",
                    event.name(),
                    event.token(),
                    self.session.state
                );
            }
            Disposition::Applied => {
                if let SessionEvent::Interpreted {
                    outcome: Err(e), ..
                } = &event
                {
                    tracing::warn!(
                        "Interpretation failed for session {}: {} ({})",
                        self.session.token,
                        e,
                        e.recovery_suggestion()
                    );
                }
                tracing::debug!(
                    "Session {}: {:?} --{}--> {:?}",
                    self.session.token,
                    self.session.state,
                    event.name(),
                    step.session.state
                );
                self.apply(step, Some(order));
            }
        }
    }

    fn apply(&mut self, step: Transition, mut order: Option<&mut OrderAggregator>) {
        self.session = step.session;
        for effect in step.effects {
            self.run_effect(effect, order.as_deref_mut());
        }
        if self.session.state == SessionState::Terminated {
            self.session.state = SessionState::Idle;
            tracing::info!("Voice session {} ended", self.session.token);
        }
    }

    fn run_effect(&mut self, effect: Effect, order: Option<&mut OrderAggregator>) {
        match effect {
            Effect::CancelTimeout => self.cancel_timeout(),
            Effect::StopRecognizer => self.stop_recognizer(),
            Effect::StartRecognizer => {
                if let Err(e) = self.start_recognizer() {
                    tracing::error!("Failed to start recognition: {}", e);
                }
            }
            Effect::ArmTimeout => self.arm_timeout(),
            Effect::Announce(utterance) => self.announce(&utterance),
            Effect::Interpret(transcript) => self.spawn_interpretation(transcript),
            Effect::ApplyOrder(result) => match order {
                Some(order) => self.apply_order(&result, order),
                None => tracing::error!("Order mutation requested without an order"),
            },
        }
    }

    fn start_recognizer(&mut self) -> Result<()> {
        let recognizer = self
            .recognizer
            .as_mut()
            .ok_or(KioskError::UnsupportedDevice)?;
        recognizer.start(self.session.token, self.events.clone())?;
        self.recognizer_active = true;
        Ok(())
    }

    fn stop_recognizer(&mut self) {
        if !self.recognizer_active {
            return;
        }
        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.stop();
        }
        self.recognizer_active = false;
    }

    fn arm_timeout(&mut self) {
        self.cancel_timeout();
        let token = self.session.token;
        let timeout = self.timeout;
        let events = self.events.clone();
        self.timeout_handle = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = events.send(SessionEvent::Timeout { token });
        }));
    }

    fn cancel_timeout(&mut self) {
        if let Some(handle) = self.timeout_handle.take() {
            handle.abort();
        }
    }

    fn spawn_interpretation(&self, transcript: String) {
        let token = self.session.token;
        let interpreter = Arc::clone(&self.interpreter);
        let events = self.events.clone();
        tracing::info!("Session {} heard: '{}'", token, transcript);
        tokio::spawn(async move {
            let outcome = interpreter.interpret(&transcript).await;
            let _ = events.send(SessionEvent::Interpreted {
                token,
                transcript,
                outcome,
            });
        });
    }

    // Each pair is applied on its own; an unmatched name is dropped without
    // affecting the others.
    fn apply_order(&self, result: &InterpretationResult, order: &mut OrderAggregator) {
        for (name, quantity) in &result.order_items {
            match self.matcher.resolve(name) {
                Some(item) => match order.add_units(&item, *quantity) {
                    Ok(()) => tracing::info!("Voice order: {} x{}", item.name, quantity),
                    Err(e) => tracing::warn!("Voice order item '{}' dropped: {}", name, e),
                },
                None => tracing::warn!("Voice order item '{}' is not on the menu", name),
            }
        }
    }

    fn announce(&self, utterance: &Utterance) {
        self.feedback.announce(&self.prompts.render(utterance));
    }
}

impl Drop for VoiceSessionController {
    fn drop(&mut self) {
        self.cancel_timeout();
        self.stop_recognizer();
    }
}
