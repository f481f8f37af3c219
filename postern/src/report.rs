//! Rendering of acceptance results for the command line.

use postern_common::Status;
use postern_delivery::{AcceptanceResult, ValidationOutcome};

/// `sysexits.h` EX_TEMPFAIL, so callers such as sendmail wrappers retry
pub const EX_TEMPFAIL: u8 = 75;

/// The SMTP reply line for an acceptance attempt, e.g. `250 Ok: queued as ...`
#[must_use]
pub fn reply_line(result: &AcceptanceResult) -> String {
    let (status, text) = match result {
        Ok(accepted) => accepted.reply(),
        Err(err) => err.reply(),
    };

    format!("{status} {text}")
}

/// Process exit code for an acceptance attempt
#[must_use]
pub fn exit_code(result: &AcceptanceResult) -> u8 {
    match result {
        Ok(_) => 0,
        Err(err) if err.is_temporary() => EX_TEMPFAIL,
        Err(_) => 1,
    }
}

/// One line describing how a recipient would be treated
#[must_use]
pub fn describe(address: &str, outcome: &ValidationOutcome) -> String {
    match outcome {
        ValidationOutcome::Valid(local_part) => {
            format!("{address}: {} ok, local account {local_part}", Status::Ok)
        }
        ValidationOutcome::UnknownLocalPart(local_part) => {
            format!("{address}: {} unknown local account {local_part}", Status::Error)
        }
        ValidationOutcome::MalformedAddress(err) => {
            format!("{address}: {} {err}", Status::MailboxNameNotAllowed)
        }
    }
}

#[cfg(test)]
mod tests {
    use postern_common::address;
    use postern_delivery::{AcceptError, Accepted};
    use postern_spool::{SpoolError, SpooledMessageId};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn exit_codes_follow_classification() {
        let accepted: AcceptanceResult = Ok(Accepted {
            id: SpooledMessageId::generate(),
        });
        let unknown: AcceptanceResult = Err(AcceptError::UnknownRecipient(
            address::resolve("eve@corp.com").unwrap(),
        ));
        let malformed: AcceptanceResult = Err(address::resolve("@corp.com").unwrap_err().into());
        let store: AcceptanceResult = Err(AcceptError::StoreFailure(SpoolError::Internal(
            "disk full".to_string(),
        )));

        assert_eq!(exit_code(&accepted), 0);
        assert_eq!(exit_code(&unknown), 1);
        assert_eq!(exit_code(&malformed), 1);
        assert_eq!(exit_code(&store), EX_TEMPFAIL);
    }

    #[test]
    fn reply_lines() {
        let id = SpooledMessageId::generate();
        let accepted: AcceptanceResult = Ok(Accepted { id: id.clone() });
        assert_eq!(reply_line(&accepted), format!("250 Ok: queued as {id}"));

        let unknown: AcceptanceResult = Err(AcceptError::UnknownRecipient(
            address::resolve("eve@corp.com").unwrap(),
        ));
        assert!(reply_line(&unknown).starts_with("550 "));

        let store: AcceptanceResult = Err(AcceptError::StoreFailure(SpoolError::Internal(
            "disk full".to_string(),
        )));
        assert!(reply_line(&store).starts_with("451 "));
    }

    #[test]
    fn describes_outcomes() {
        let lp = address::resolve("bob@corp.com").unwrap();
        assert!(describe("bob@corp.com", &ValidationOutcome::Valid(lp)).contains(" 250 "));

        let err = address::resolve("bob").unwrap_err();
        assert!(describe("bob", &ValidationOutcome::MalformedAddress(err)).starts_with("bob: 553"));
    }
}
