/// Free-standing text label drawn on top of the scene.
#[derive(Debug)]
pub(crate) struct Text {
    text: String,
}

impl Text {
    pub(crate) fn new(text: String) -> Self {
        Self { text }
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.text = text;
    }
}
