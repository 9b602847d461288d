use tokio::sync::watch;

/// Observable request lifecycle: loading flag, display-ready error, data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestState<T> {
    pub is_loading: bool,
    pub error: Option<String>,
    pub data: T,
}

/// Holder for a [`RequestState`] that UI layers can read or subscribe to
#[derive(Debug)]
pub struct StateCell<T> {
    tx: watch::Sender<RequestState<T>>,
}

impl<T: Default> Default for StateCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default> StateCell<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(RequestState::default());
        Self { tx }
    }
}

impl<T> StateCell<T> {
    pub fn read<R>(&self, f: impl FnOnce(&RequestState<T>) -> R) -> R {
        let state = self.tx.borrow();
        f(&*state)
    }

    pub fn is_loading(&self) -> bool {
        self.read(|s| s.is_loading)
    }

    pub fn error(&self) -> Option<String> {
        self.read(|s| s.error.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState<T>> {
        self.tx.subscribe()
    }

    /// Start an attempt: loading on, previous error cleared.
    ///
    /// Runs synchronously, so the flag is visible before the caller's first
    /// await. The returned guard resets the flag even if the attempt is
    /// dropped mid-flight.
    pub fn begin(&self) -> InFlight<'_, T> {
        self.tx.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
        InFlight { cell: self, done: false }
    }
}

impl<T: Clone> StateCell<T> {
    pub fn snapshot(&self) -> RequestState<T> {
        self.read(|s| s.clone())
    }

    pub fn data(&self) -> T {
        self.read(|s| s.data.clone())
    }
}

/// An attempt started by [`StateCell::begin`]
#[must_use = "an attempt must be finished with succeed or fail"]
pub struct InFlight<'a, T> {
    cell: &'a StateCell<T>,
    done: bool,
}

impl<T> InFlight<'_, T> {
    pub fn succeed(mut self, update: impl FnOnce(&mut T)) {
        self.done = true;
        self.cell.tx.send_modify(|s| {
            update(&mut s.data);
            s.is_loading = false;
        });
    }

    /// Record a failure; data stays as it was
    pub fn fail(mut self, message: impl Into<String>) {
        self.done = true;
        let message = message.into();
        self.cell.tx.send_modify(|s| {
            s.error = Some(message);
            s.is_loading = false;
        });
    }
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        if !self.done {
            self.cell.tx.send_modify(|s| s.is_loading = false);
        }
    }
}
