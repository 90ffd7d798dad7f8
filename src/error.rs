use std::fmt;

/// Errors that abort a whole conversion run.
///
/// Per-image problems (missing GPS tags, undecodable files, malformed
/// subfields) never surface here — they are degraded locally and reported
/// through [`ConversionReport::warnings`](crate::pipeline::ConversionReport).
/// This enum only carries conditions the caller is expected to match on,
/// typically via [`anyhow::Error::downcast_ref`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertError {
    /// Every candidate image was processed and none produced usable GPS
    /// metadata. No archive is written in this case.
    NoValidGpsData,
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::NoValidGpsData => {
                write!(f, "no valid GPS metadata found in the input images")
            }
        }
    }
}

impl std::error::Error for ConvertError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_valid_gps_data_is_downcastable_through_anyhow() {
        let err: anyhow::Error = ConvertError::NoValidGpsData.into();
        assert_eq!(
            err.downcast_ref::<ConvertError>(),
            Some(&ConvertError::NoValidGpsData)
        );
    }

    #[test]
    fn display_names_the_condition() {
        let msg = ConvertError::NoValidGpsData.to_string();
        assert!(msg.contains("GPS metadata"));
    }
}
