#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub object_key: String,
    pub url: String,
}
