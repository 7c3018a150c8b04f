mod answer;
mod asset;
mod category;
mod ids;
mod question;

pub use answer::{AnswerKey, ParseKeyError, TargetCase};
pub use asset::{AssetError, AssetRequest, AssetResponse, CacheVersion, RequestKey, RequestMethod};
pub use category::{ArticleLabels, Category, LabelResolver};
pub use ids::SessionId;
pub use question::{QuestionBank, QuestionRecord};
