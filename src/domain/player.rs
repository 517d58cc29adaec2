/// One of the two competitors in a session. Identity is an opaque string
/// supplied by the transport; it must be unique within the session.
#[derive(Debug, Clone)]
pub struct Player {
    id: String,
    name: String,
    alive: bool,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            alive: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Irreversible; a sunk player stays sunk.
    pub fn sink(&mut self) {
        self.alive = false;
    }
}
