//! Screen state for the recipe grid.
//!
//! The platform view layer owns a [`ViewModel`] and replaces it with the
//! result of [`reduce`] whenever the user acts or a background operation
//! reports back. `reduce` never touches the store or the network.

use serde::Serialize;

use crate::model::RecipeCollection;
use crate::refresh::{PullIndicator, RefreshState};
use crate::search::SearchState;

/// Preset theme colors offered by the color picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeColor {
    Red,
    Orange,
    #[default]
    Blue,
    Purple,
    Green,
    Yellow,
    Pink,
    Cyan,
    Gray,
    Black,
    White,
}

impl ThemeColor {
    /// Picker order
    pub const ALL: [ThemeColor; 11] = [
        ThemeColor::Red,
        ThemeColor::Orange,
        ThemeColor::Blue,
        ThemeColor::Purple,
        ThemeColor::Green,
        ThemeColor::Yellow,
        ThemeColor::Pink,
        ThemeColor::Cyan,
        ThemeColor::Gray,
        ThemeColor::Black,
        ThemeColor::White,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeColor::Red => "red",
            ThemeColor::Orange => "orange",
            ThemeColor::Blue => "blue",
            ThemeColor::Purple => "purple",
            ThemeColor::Green => "green",
            ThemeColor::Yellow => "yellow",
            ThemeColor::Pink => "pink",
            ThemeColor::Cyan => "cyan",
            ThemeColor::Gray => "gray",
            ThemeColor::Black => "black",
            ThemeColor::White => "white",
        }
    }
}

/// The recipe whose video sheet is open
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoSelection {
    pub recipe_id: String,
    pub video_url: String,
    /// Where ingredients are fetched from, if anywhere
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewModel {
    pub search: SearchState,
    pub refresh: RefreshState,
    /// Header above the grid while pulling or refreshing
    pub pull: PullIndicator,
    pub theme: ThemeColor,
    pub theme_picker_open: bool,
    pub calendar_open: bool,
    pub menu_active: bool,
    pub video: Option<VideoSelection>,
}

impl ViewModel {
    pub fn new(collection: &RecipeCollection) -> Self {
        Self {
            search: SearchState::new(collection, ""),
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    QueryChanged(String),
    SuggestionChosen(String),
    /// The store was replaced; derived lists must be rebuilt
    CollectionReplaced,
    /// The pull gesture moved; carries what the header should show
    PullChanged(PullIndicator),
    RefreshStarted,
    RefreshFinished,
    ToggleMenu,
    ToggleThemePicker,
    ThemeChosen(ThemeColor),
    ToggleCalendar,
    RecipeTapped(String),
    VideoClosed,
}

/// Apply `action` to `vm`, reading recipes from `collection`
pub fn reduce(vm: &ViewModel, collection: &RecipeCollection, action: Action) -> ViewModel {
    let mut next = vm.clone();
    match action {
        Action::QueryChanged(query) => next.search = SearchState::new(collection, query),
        Action::SuggestionChosen(name) => next.search = SearchState::new(collection, name),
        Action::CollectionReplaced => {
            next.search = vm.search.refresh(collection);
            if let Some(video) = &vm.video {
                if collection.get(&video.recipe_id).is_none() {
                    next.video = None;
                }
            }
        }
        Action::PullChanged(indicator) => {
            // The spinner stays up until the reload reports back
            if vm.refresh == RefreshState::Idle {
                next.pull = indicator;
            }
        }
        Action::RefreshStarted => {
            next.refresh = RefreshState::Refreshing;
            next.pull = PullIndicator::refreshing();
        }
        Action::RefreshFinished => {
            next.refresh = RefreshState::Idle;
            next.pull = PullIndicator::default();
        }
        Action::ToggleMenu => next.menu_active = !vm.menu_active,
        Action::ToggleThemePicker => next.theme_picker_open = !vm.theme_picker_open,
        Action::ThemeChosen(color) => {
            next.theme = color;
            next.theme_picker_open = false;
        }
        Action::ToggleCalendar => next.calendar_open = !vm.calendar_open,
        Action::RecipeTapped(id) => {
            // Only recipes on screen can be tapped; no video means no sheet
            if let Some(recipe) = vm.search.filtered.iter().find(|r| r.id == id) {
                if let Some(video_url) = &recipe.video_url {
                    next.video = Some(VideoSelection {
                        recipe_id: recipe.id.clone(),
                        video_url: video_url.clone(),
                        source_url: recipe.source_url.clone(),
                    });
                }
            }
        }
        Action::VideoClosed => next.video = None,
    }
    next
}
