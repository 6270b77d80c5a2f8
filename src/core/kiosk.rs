use crate::core::catalog::MenuCatalog;
use crate::core::matcher::MenuMatcher;
use crate::core::order::OrderAggregator;
use crate::core::session::{Prompts, VoiceSessionController};
use crate::domain::model::{format_won, MenuItem, OrderSnapshot, Receipt, SessionState, SessionToken};
use crate::domain::ports::{EventReceiver, Feedback, SessionEvent, SpeechRecognizer, TranscriptInterpreter};
use crate::utils::error::{KioskError, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Operations the touch UI calls: menu, cart and the voice button.
///
/// All mutation happens on the caller's task; asynchronous session events
/// are handed back through [`Kiosk::dispatch`].
pub struct Kiosk {
    catalog: MenuCatalog,
    order: OrderAggregator,
    voice: VoiceSessionController,
    feedback: Arc<dyn Feedback>,
}

pub struct KioskBuilder {
    catalog: MenuCatalog,
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    interpreter: Arc<dyn TranscriptInterpreter>,
    feedback: Arc<dyn Feedback>,
    prompts: Prompts,
    timeout: Option<Duration>,
}

impl KioskBuilder {
    pub fn new(interpreter: Arc<dyn TranscriptInterpreter>, feedback: Arc<dyn Feedback>) -> Self {
        Self {
            catalog: MenuCatalog::default(),
            recognizer: None,
            interpreter,
            feedback,
            prompts: Prompts::default(),
            timeout: None,
        }
    }

    pub fn catalog(mut self, catalog: MenuCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn recognizer(mut self, recognizer: Box<dyn SpeechRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn session_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Must be called inside a Tokio runtime: sessions spawn timer and
    /// interpretation tasks.
    pub fn build(self) -> (Kiosk, EventReceiver) {
        let matcher = MenuMatcher::new(self.catalog.clone());
        let (mut voice, events) = VoiceSessionController::new(
            self.recognizer,
            self.interpreter,
            matcher,
            Arc::clone(&self.feedback),
        );
        voice = voice.with_prompts(self.prompts);
        if let Some(timeout) = self.timeout {
            voice = voice.with_timeout(timeout);
        }
        let kiosk = Kiosk {
            catalog: self.catalog,
            order: OrderAggregator::new(),
            voice,
            feedback: self.feedback,
        };
        (kiosk, events)
    }
}

impl Kiosk {
    pub fn builder(
        interpreter: Arc<dyn TranscriptInterpreter>,
        feedback: Arc<dyn Feedback>,
    ) -> KioskBuilder {
        KioskBuilder::new(interpreter, feedback)
    }

    pub fn menu(&self) -> &[Arc<MenuItem>] {
        self.catalog.all()
    }

    /// Adds a single unit, as a tap on a menu tile does.
    pub fn add_one(&mut self, id: u32) -> Result<()> {
        let item = self.catalog.by_id(id)?;
        self.order.add(&item);
        Ok(())
    }

    /// Quantity-dialog confirmation: adds `quantity` units and says so.
    pub fn add_item(&mut self, id: u32, quantity: u32) -> Result<()> {
        let item = self.catalog.by_id(id)?;
        self.order.add_units(&item, quantity)?;
        tracing::info!("Manual order: {} x{}", item.name, quantity);
        self.feedback
            .announce(&self.voice.prompts().item_added(&item.name, quantity));
        Ok(())
    }

    pub fn clear_order(&mut self) {
        self.order.clear();
    }

    pub fn snapshot(&self) -> OrderSnapshot {
        self.order.snapshot()
    }

    pub fn total(&self) -> u64 {
        self.order.total()
    }

    /// Completes the order and empties the cart.
    pub fn checkout(&mut self) -> Result<Receipt> {
        let snapshot = self.order.snapshot();
        if snapshot.is_empty() {
            return Err(KioskError::EmptyOrder);
        }
        let receipt = Receipt {
            summary: snapshot.summary(),
            total: snapshot.total,
            completed_at: Utc::now(),
        };
        tracing::info!(
            "Order completed: {} (total {})",
            receipt.summary,
            format_won(receipt.total)
        );
        self.order.clear();
        Ok(receipt)
    }

    pub fn start_voice(&mut self) -> Result<SessionToken> {
        self.voice.start()
    }

    pub fn stop_voice(&mut self) {
        self.voice.stop();
    }

    pub fn dispatch(&mut self, event: SessionEvent) {
        self.voice.handle(event, &mut self.order);
    }

    pub fn voice_state(&self) -> SessionState {
        self.voice.state()
    }

    pub fn voice_supported(&self) -> bool {
        self.voice.is_supported()
    }

    pub fn voice(&self) -> &VoiceSessionController {
        &self.voice
    }
}
