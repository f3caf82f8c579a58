/// The state of a future: still pending, or settled to exactly one of a
/// value or an error.
///
/// Once a future leaves `Pending` its outcome never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome<T, E> {
    Pending,
    Success(T),
    Failure(E),
}

impl<T, E> Default for Outcome<T, E> {
    fn default() -> Self {
        Outcome::Pending
    }
}

impl<T, E> Outcome<T, E> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending)
    }

    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// Borrow the settled value or error, `None` while pending.
    pub fn as_result(&self) -> Option<Result<&T, &E>> {
        match self {
            Outcome::Pending => None,
            Outcome::Success(value) => Some(Ok(value)),
            Outcome::Failure(error) => Some(Err(error)),
        }
    }

    pub fn into_result(self) -> Option<Result<T, E>> {
        match self {
            Outcome::Pending => None,
            Outcome::Success(value) => Some(Ok(value)),
            Outcome::Failure(error) => Some(Err(error)),
        }
    }
}

impl<T: Clone, E: Clone> Outcome<T, E> {
    /// Clone out whichever side is settled.
    pub fn to_result(&self) -> Option<Result<T, E>> {
        self.as_result()
            .map(|result| result.map(T::clone).map_err(E::clone))
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(error) => Outcome::Failure(error),
        }
    }
}
