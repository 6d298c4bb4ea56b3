mod home;
mod practice;
mod state;

pub use home::HomeView;
pub use practice::{PracticeView, TopicPracticeView};
pub use state::{ViewError, ViewState, view_state_from_resource};
