/// A fully recognized link reference definition, e.g. `[foo]: /url "title"`.
///
/// Built only when a definition has been recognized in full; the label is
/// already normalized and destination and title are already unescaped.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkReferenceDefinition {
    label: String,
    destination: String,
    title: Option<String>,
}

impl LinkReferenceDefinition {
    pub(crate) fn new(label: String, destination: String, title: Option<String>) -> Self {
        Self {
            label,
            destination,
            title,
        }
    }

    /// The normalized lookup key, e.g. `foo` for `[Foo]`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}
