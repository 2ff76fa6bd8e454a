use super::ErrorCode;

pub fn all_codes() -> &'static [ErrorCode] {
    &[
        ErrorCode::ConfigInvalidJson,
        ErrorCode::ConfigInvalidValue,
        ErrorCode::ValidationMissingArgument,
        ErrorCode::ValidationInvalidArgument,
        ErrorCode::ValidationInvalidJson,
        ErrorCode::ValidationMultipleErrors,
        ErrorCode::ProjectNotFound,
        ErrorCode::ComponentNotFound,
        ErrorCode::ImportNoMatches,
        ErrorCode::ImportNoLanguages,
        ErrorCode::ImportSlugExhausted,
        ErrorCode::VcsCommandFailed,
        ErrorCode::VcsLocked,
        ErrorCode::InternalIoError,
        ErrorCode::InternalJsonError,
        ErrorCode::InternalUnexpected,
    ]
}

pub fn parse_code(code: &str) -> Option<ErrorCode> {
    all_codes()
        .iter()
        .copied()
        .find(|candidate| candidate.as_str() == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_parses_back() {
        for code in all_codes() {
            assert_eq!(parse_code(code.as_str()), Some(*code));
        }
    }

    #[test]
    fn unknown_code_is_none() {
        assert_eq!(parse_code("deploy.build_failed"), None);
    }
}
