use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    #[default]
    None,
    InProgress,
    Complete,
}

/// Status of one asynchronous request plus its last payload and error.
///
/// `request` only moves the status; `succeed` stores the payload and clears
/// the error; `fail` stores the error and leaves the payload alone.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T, E> {
    pub status: FetchStatus,
    pub error: Option<E>,
    pub data: Option<T>,
}

impl<T, E> Default for FetchState<T, E> {
    fn default() -> Self {
        Self {
            status: FetchStatus::None,
            error: None,
            data: None,
        }
    }
}

impl<T: Clone, E: Clone> FetchState<T, E> {
    pub fn request(&self) -> Self {
        Self {
            status: FetchStatus::InProgress,
            ..self.clone()
        }
    }

    pub fn succeed(&self, data: T) -> Self {
        Self {
            status: FetchStatus::Complete,
            error: None,
            data: Some(data),
        }
    }

    pub fn fail(&self, error: E) -> Self {
        Self {
            status: FetchStatus::Complete,
            error: Some(error),
            data: self.data.clone(),
        }
    }

    /// Replace the payload without touching status or error.
    pub fn with_data(&self, data: Option<T>) -> Self {
        Self {
            data,
            ..self.clone()
        }
    }
}

impl<T, E> FetchState<T, E> {
    pub fn is_in_progress(&self) -> bool {
        self.status == FetchStatus::InProgress
    }

    pub fn is_complete(&self) -> bool {
        self.status == FetchStatus::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type State = FetchState<Vec<u32>, String>;

    #[test]
    fn starts_with_none() {
        let s = State::default();
        assert_eq!(s.status, FetchStatus::None);
        assert!(s.error.is_none());
        assert!(s.data.is_none());
    }

    #[test]
    fn request_then_success() {
        let s = State::default().request();
        assert!(s.is_in_progress());
        let s = s.succeed(vec![1, 2]);
        assert!(s.is_complete());
        assert_eq!(s.data, Some(vec![1, 2]));
    }

    #[test]
    fn failure_keeps_previous_payload() {
        let s = State::default().succeed(vec![7]).request().fail("boom".to_string());
        assert!(s.is_complete());
        assert_eq!(s.error.as_deref(), Some("boom"));
        assert_eq!(s.data, Some(vec![7]));
    }

    #[test]
    fn success_clears_error() {
        let s = State::default().fail("boom".to_string()).request();
        assert_eq!(s.error.as_deref(), Some("boom"));
        let s = s.succeed(vec![]);
        assert!(s.error.is_none());
    }
}
