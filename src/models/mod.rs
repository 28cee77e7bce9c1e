pub mod audio;
pub mod draft;
pub mod loaders;
pub mod option_set;
pub mod payload;
pub mod word_list;

pub use audio::{AudioArtifact, CaptureFormat};
pub use draft::{ChoiceDraft, ListeningDraft, OrderingDraft, QuestionDraft, QuestionType};
pub use loaders::{list_draft_files, load_draft_file, DraftFile};
pub use option_set::{OptionCandidate, OptionId, OptionSet, OptionSetWarning};
pub use payload::{SubmissionPayload, PayloadBody};
pub use word_list::{WordList, WordListWarning};
