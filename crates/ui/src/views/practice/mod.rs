mod completion;
mod history;
mod question_card;
mod timer;
mod view;

pub use view::{PracticeView, TopicPracticeView};

#[cfg(test)]
pub(crate) use view::PracticeTestHandles;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod flow_smoke;
