//! Guided shopping dialogue flow
//!
//! The assistant walks category → size → color → product. Each user selection
//! is planned as a prospective transition: the instruction to send, the state
//! to move to, and what kind of payload the response should carry. Nothing is
//! committed until the response arrives; a failed request leaves the live
//! state exactly as it was (only an apology lands in the transcript).
//!
//! "Yes"/"No" are controller-owned control tokens, never backend data, so a
//! catalog option that happens to be named "Yes" stays an ordinary option.

use serde::{Deserialize, Serialize};

use crate::options::{self, CatalogOption, Product};
use crate::transcript::{ChatMessage, Transcript};

pub const WELCOME: &str = "Welcome to our shopping assistant! I'm here to help you find the perfect item. What type of product are you looking for today?";
pub const FAREWELL: &str = "Thanks for shopping with me today! Hope to see you again soon! 👋";
pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";
pub const NO_PRODUCTS: &str = "Sorry, I couldn't find any products matching your choices. Would you like to look for something else?";
pub const PRODUCTS_INTRO: &str = "Here are some products you might like:";
pub const PRODUCTS_FOLLOW_UP: &str = "Would you like to look for something else?";

/// At most this many recommendations are surfaced per product query
pub const MAX_RECOMMENDATIONS: usize = 4;

/// Where the guided flow currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Welcome,
    Size,
    Color,
    Product,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Welcome => "welcome",
            Step::Size => "size",
            Step::Color => "color",
            Step::Product => "product",
        }
    }
}

/// Accumulated selections for one pass through the flow.
///
/// Invariant: `category` is set iff the step is past Welcome, `size` iff past
/// Size, `color` iff at Product. Transitions build a fresh value; the live
/// state is only replaced once the dependent request has succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShoppingState {
    pub step: Step,
    pub category: Option<CatalogOption>,
    pub size: Option<CatalogOption>,
    pub color: Option<CatalogOption>,
}

impl ShoppingState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// An entry in the option picker: either a catalog option sourced from the
/// backend, or one of the two control tokens the controller itself offers
/// after product results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Catalog(CatalogOption),
    /// "Yes" - look for something else
    Continue,
    /// "No" - done shopping
    Quit,
}

impl Choice {
    pub fn label(&self) -> &str {
        match self {
            Choice::Catalog(option) => &option.name,
            Choice::Continue => "Yes",
            Choice::Quit => "No",
        }
    }
}

/// The kind of payload a planned request should come back with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Options,
    Products,
}

/// A prospective transition: issue `instruction`, and on success move to
/// `next` while surfacing the response per `expects`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub instruction: String,
    pub next: ShoppingState,
    pub expects: Expectation,
    /// Assistant prompt introducing the next decision, appended on success.
    /// None when the greeting (or the product block) already carries it.
    pub prompt: Option<String>,
}

impl TransitionPlan {
    /// The category fetch that restarts a pass through the flow
    pub fn category_fetch() -> Self {
        let next = ShoppingState::new();
        Self {
            instruction: "get_categories".to_string(),
            prompt: Some(arrival_prompt(&next)),
            next,
            expects: Expectation::Options,
        }
    }

    /// The category fetch issued on entry. The welcome greeting already asks
    /// the category question, so success appends no extra prompt.
    fn entry_fetch() -> Self {
        Self {
            prompt: None,
            ..Self::category_fetch()
        }
    }
}

/// How the controller reacts to a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// Say goodbye and idle at Welcome with no options; no request is issued
    Farewell,
    /// Issue the planned request
    Request(TransitionPlan),
}

/// Plan the reaction to a picker selection at the given state.
///
/// The control tokens short-circuit the step table: Quit ends the pass from
/// any step, Continue restarts the category fetch. A catalog pick advances
/// one step; a catalog pick arriving at Product (where only the control
/// tokens are offered) is invalid input and resets to a fresh category fetch.
pub fn plan(current: &ShoppingState, choice: &Choice) -> Reaction {
    let option = match choice {
        Choice::Quit => return Reaction::Farewell,
        Choice::Continue => return Reaction::Request(TransitionPlan::category_fetch()),
        Choice::Catalog(option) => option,
    };

    let plan = match (current.step, &current.category, &current.size) {
        (Step::Welcome, _, _) => {
            let next = ShoppingState {
                step: Step::Size,
                category: Some(option.clone()),
                size: None,
                color: None,
            };
            TransitionPlan {
                instruction: format!("get_sizes {}", option.id),
                prompt: Some(arrival_prompt(&next)),
                next,
                expects: Expectation::Options,
            }
        }
        (Step::Size, Some(category), _) => {
            let next = ShoppingState {
                step: Step::Color,
                category: Some(category.clone()),
                size: Some(option.clone()),
                color: None,
            };
            TransitionPlan {
                instruction: format!("get_colors {} {}", category.id, option.id),
                prompt: Some(arrival_prompt(&next)),
                next,
                expects: Expectation::Options,
            }
        }
        (Step::Color, Some(category), Some(size)) => TransitionPlan {
            instruction: format!("find_products {} {} {}", category.id, size.id, option.id),
            next: ShoppingState {
                step: Step::Product,
                category: Some(category.clone()),
                size: Some(size.clone()),
                color: Some(option.clone()),
            },
            expects: Expectation::Products,
            prompt: None,
        },
        // Product step offers only the control tokens; a catalog pick here
        // (or a state that lost a prior selection) restarts the flow.
        _ => TransitionPlan::category_fetch(),
    };
    Reaction::Request(plan)
}

/// The assistant prompt that introduces the decision at `state.step`
fn arrival_prompt(state: &ShoppingState) -> String {
    let category = state.category.as_ref().map(|c| c.name.as_str()).unwrap_or_default();
    match state.step {
        Step::Size => format!("Great! For {category}, what size are you looking for?"),
        Step::Color => {
            let size = state.size.as_ref().map(|s| s.name.as_str()).unwrap_or_default();
            format!(
                "Excellent choice! Now, what color would you prefer for the {category} in size {size}?"
            )
        }
        Step::Welcome | Step::Product => "What type of product are you looking for today?".to_string(),
    }
}

/// Everything to apply atomically once a planned request succeeds
#[derive(Debug, Clone)]
pub struct Outcome {
    pub messages: Vec<ChatMessage>,
    pub choices: Vec<Choice>,
    pub state: ShoppingState,
}

/// Shape a successful response into transcript entries, the next option set,
/// and the committed state.
pub fn apply_success(plan: &TransitionPlan, content: &serde_json::Value) -> Outcome {
    match plan.expects {
        Expectation::Options => {
            let choices = options::normalize(content)
                .into_iter()
                .map(Choice::Catalog)
                .collect();
            Outcome {
                messages: plan
                    .prompt
                    .iter()
                    .map(|prompt| ChatMessage::assistant(prompt.clone()))
                    .collect(),
                choices,
                state: plan.next.clone(),
            }
        }
        Expectation::Products => {
            let products: Vec<Product> = options::parse_products(content)
                .into_iter()
                .take(MAX_RECOMMENDATIONS)
                .collect();
            let messages = if products.is_empty() {
                vec![ChatMessage::assistant(NO_PRODUCTS)]
            } else {
                let mut messages = vec![ChatMessage::assistant(PRODUCTS_INTRO)];
                messages.extend(products.iter().map(|p| ChatMessage::product(p.display_line())));
                messages.push(ChatMessage::assistant(PRODUCTS_FOLLOW_UP));
                messages
            };
            Outcome {
                messages,
                choices: vec![Choice::Continue, Choice::Quit],
                state: plan.next.clone(),
            }
        }
    }
}

/// The guided dialogue controller: owns the shopping transcript, the live
/// state and the current option set, and keeps the three in step. The caller
/// (the widget shell, or a test) issues the planned requests and feeds the
/// result back through [`ShoppingFlow::commit`] or [`ShoppingFlow::fail`].
#[derive(Debug, Default)]
pub struct ShoppingFlow {
    state: ShoppingState,
    transcript: Transcript,
    choices: Vec<Choice>,
}

impl ShoppingFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ShoppingState {
        &self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Entry into shopping mode: greet and hand back the category fetch that
    /// populates the first option set. Guarded - a populated transcript means
    /// the pass is already under way, so nothing fires twice.
    pub fn begin(&mut self) -> Option<TransitionPlan> {
        if self.state.step != Step::Welcome || !self.transcript.is_empty() {
            return None;
        }
        self.transcript.append(ChatMessage::assistant(WELCOME));
        Some(TransitionPlan::entry_fetch())
    }

    /// Record the user's pick and plan the follow-up request, if one is
    /// needed. Quit is terminal: the farewell lands, selections and options
    /// clear, and no request goes out.
    pub fn select(&mut self, choice: &Choice) -> Option<TransitionPlan> {
        self.transcript.append(ChatMessage::user(choice.label()));
        match plan(&self.state, choice) {
            Reaction::Farewell => {
                self.transcript.append(ChatMessage::assistant(FAREWELL));
                self.state = ShoppingState::new();
                self.choices.clear();
                None
            }
            Reaction::Request(plan) => Some(plan),
        }
    }

    /// Apply a successful response: transcript entries, the next option set
    /// and the planned state move together.
    pub fn commit(&mut self, plan: &TransitionPlan, content: &serde_json::Value) {
        let outcome = apply_success(plan, content);
        for message in outcome.messages {
            self.transcript.append(message);
        }
        self.choices = outcome.choices;
        self.state = outcome.state;
    }

    /// Apply a transport failure: one apology entry, options cleared, and
    /// the prospective state dropped - the live state stays at its
    /// pre-request value.
    pub fn fail(&mut self) {
        self.transcript.append(ChatMessage::assistant(APOLOGY));
        self.choices.clear();
    }

    /// Forget the whole pass (used when the widget leaves shopping mode)
    pub fn reset(&mut self) {
        self.state = ShoppingState::new();
        self.transcript.clear();
        self.choices.clear();
    }
}
