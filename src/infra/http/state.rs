use std::sync::Arc;

use crate::application::comments::CommentService;
use crate::application::sync::ContentSync;

#[derive(Clone)]
pub struct HttpState {
    pub sync: Arc<ContentSync>,
    pub comments: Arc<CommentService>,
}
