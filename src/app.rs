use anyhow::Result;
use ratatui::widgets::ListState;
use serde_json::Value;
use tokio::task::JoinHandle;

use boutique_chat::client::{Channel, RecommendationClient};
use boutique_chat::config::Config;
use boutique_chat::flow::{self, ShoppingFlow, TransitionPlan};
use boutique_chat::transcript::{ChatMessage, Transcript};

/// Which conversation panel is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    General,
    Shopping,
    Contact,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::General => "General",
            Mode::Shopping => "Shopping",
            Mode::Contact => "Contact",
        }
    }

    pub fn all() -> [Mode; 3] {
        [Mode::General, Mode::Shopping, Mode::Contact]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// What an in-flight request will be applied as once it settles
enum RequestKind {
    /// General-chat turn; the response is free text
    Chat,
    /// Guided-flow transition; committed only on success
    Shopping(TransitionPlan),
}

/// The single outstanding backend request, tagged with the epoch of the
/// state it was issued against. A completion whose epoch no longer matches
/// is discarded without touching state.
struct PendingRequest {
    epoch: u64,
    kind: RequestKind,
    task: JoinHandle<Result<Value>>,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub mode: Mode,
    pub input_mode: InputMode,

    // Conversation state: the general transcript, and the guided flow which
    // owns the shopping transcript, selections and option set
    pub general: Transcript,
    pub flow: ShoppingFlow,
    pub picker_state: ListState,

    // Request state
    pub loading: bool,
    pending: Option<PendingRequest>,
    epoch: u64,

    // General chat input
    pub chat_input: String,
    pub chat_cursor: usize, // cursor position in chat_input, in chars

    // Chat viewport (for scroll calculations, updated during render)
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Backend
    pub client: RecommendationClient,
    pub config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        let client = RecommendationClient::new(&config.endpoint);
        let mut app = Self {
            should_quit: false,
            mode: Mode::General,
            input_mode: InputMode::Normal,

            general: Transcript::new(),
            flow: ShoppingFlow::new(),
            picker_state: ListState::default(),

            loading: false,
            pending: None,
            epoch: 0,

            chat_input: String::new(),
            chat_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            client,
            config,
        };
        app.general
            .append(ChatMessage::assistant("Hi! How can I help you today?"));
        app
    }

    /// The transcript owned by the active mode
    pub fn active_transcript(&self) -> &Transcript {
        match self.mode {
            Mode::Shopping => self.flow.transcript(),
            _ => &self.general,
        }
    }

    /// Switch panels. The mode being left gives up its transcript, and any
    /// in-flight request is abandoned: the epoch moves on, so a late
    /// completion can never be applied against the new mode's state.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        self.epoch += 1;
        self.pending = None;
        self.loading = false;
        self.input_mode = InputMode::Normal;
        self.chat_scroll = 0;

        match self.mode {
            Mode::Shopping => {
                self.flow.reset();
                self.picker_state.select(None);
            }
            Mode::General => {
                self.general.clear();
                self.chat_input.clear();
                self.chat_cursor = 0;
            }
            Mode::Contact => {}
        }

        self.mode = mode;
        if self.mode == Mode::Shopping {
            // Populate the first option set; the flow guards against firing
            // the fetch twice for one pass.
            if let Some(plan) = self.flow.begin() {
                self.spawn_shopping_request(plan);
            }
        }
    }

    // Option picker navigation
    pub fn picker_down(&mut self) {
        let len = self.flow.choices().len();
        if len > 0 {
            let i = self.picker_state.selected().unwrap_or(0);
            self.picker_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn picker_up(&mut self) {
        let i = self.picker_state.selected().unwrap_or(0);
        self.picker_state.select(Some(i.saturating_sub(1)));
    }

    /// Act on the highlighted picker entry. Ignored while a request is
    /// outstanding - at most one in-flight request per widget.
    pub fn select_choice(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let Some(choice) = self
            .picker_state
            .selected()
            .and_then(|i| self.flow.choices().get(i))
            .cloned()
        else {
            return;
        };

        match self.flow.select(&choice) {
            Some(plan) => self.spawn_shopping_request(plan),
            None => self.picker_state.select(None),
        }
        self.scroll_chat_to_bottom();
    }

    fn spawn_shopping_request(&mut self, plan: TransitionPlan) {
        let client = self.client.clone();
        let instruction = plan.instruction.clone();
        tracing::debug!(step = self.flow.state().step.as_str(), %instruction, "shopping request");
        self.loading = true;
        let task = tokio::spawn(async move { client.request(Channel::Shopping, &instruction).await });
        self.pending = Some(PendingRequest {
            epoch: self.epoch,
            kind: RequestKind::Shopping(plan),
            task,
        });
    }

    /// Submit the general-chat input box
    pub fn submit_chat(&mut self) {
        if self.chat_input.is_empty() || self.pending.is_some() {
            return;
        }
        let input = std::mem::take(&mut self.chat_input);
        self.chat_cursor = 0;
        self.general.append(ChatMessage::user(input.clone()));
        self.loading = true;

        let client = self.client.clone();
        let task = tokio::spawn(async move { client.chat(&input).await.map(Value::String) });
        self.pending = Some(PendingRequest {
            epoch: self.epoch,
            kind: RequestKind::Chat,
            task,
        });
        self.scroll_chat_to_bottom();
    }

    /// Apply the outstanding request if it has settled. Called from the main
    /// loop; a stale completion (epoch mismatch) is dropped silently.
    pub async fn poll_pending(&mut self) {
        let finished = self
            .pending
            .as_ref()
            .map(|p| p.task.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };
        self.loading = false;

        let result = match pending.task.await {
            Ok(result) => result,
            Err(join_error) => Err(anyhow::anyhow!("request task failed: {join_error}")),
        };

        if pending.epoch != self.epoch {
            tracing::debug!("discarding response from a superseded conversation");
            return;
        }

        match pending.kind {
            RequestKind::Chat => match result {
                Ok(content) => {
                    let text = match content {
                        Value::String(text) => text,
                        other => other.to_string(),
                    };
                    self.general.append(ChatMessage::assistant(text));
                }
                Err(error) => {
                    tracing::warn!(%error, "general chat request failed");
                    self.general.append(ChatMessage::assistant(flow::APOLOGY));
                }
            },
            RequestKind::Shopping(plan) => match result {
                Ok(content) => {
                    self.flow.commit(&plan, &content);
                    self.picker_state.select(if self.flow.choices().is_empty() {
                        None
                    } else {
                        Some(0)
                    });
                }
                Err(error) => {
                    tracing::warn!(%error, instruction = %plan.instruction, "shopping request failed");
                    self.flow.fail();
                    self.picker_state.select(None);
                }
            },
        }
        self.scroll_chat_to_bottom();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Chat scrolling
    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    /// Scroll the chat pane so the latest entry (or the loading indicator)
    /// is visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for message in self.active_transcript().entries() {
            total_lines += 1; // Role line ("You:" or "Bot:")
            for line in message.content.lines() {
                // Character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        // Lines for the "Thinking..." indicator
        total_lines += 2;

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }
}
