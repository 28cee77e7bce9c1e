pub mod author;
pub mod draft_ctx;
pub mod forms;

pub use author::{QuestionAuthor, SubmitReceipt};
pub use draft_ctx::DraftCtx;
pub use forms::{ActiveForm, ChoiceForm, ListeningForm, OptionEditing, OrderingForm};
