pub mod form;
pub mod pins;
pub mod search;
pub mod seed;

use anyhow::Result;
use pinboard::{Entity, EntityStore, Guid, Session, SetsError};

use crate::context::Host;
use crate::output::OutputManager;

/// Build the session for `user`, falling back to anonymous when it is not a user.
pub fn session_for(host: &dyn Host, user: Option<Guid>, output: &OutputManager) -> Result<Session> {
    let Some(guid) = user else {
        output.verbose("No --user given, acting anonymously");
        return Ok(Session::anonymous());
    };

    match host.resolve_entity(guid)? {
        Some(Entity::User(user)) => {
            output.verbose(&format!("Acting as {} ({})", user.username, user.guid));
            Ok(Session::logged_in(user))
        }
        _ => {
            output.warning(&format!("{guid} is not a user, acting anonymously"));
            Ok(Session::anonymous())
        }
    }
}

/// Turn a rule violation into a CLI error that names its message key.
pub fn report(error: SetsError) -> anyhow::Error {
    match error.message_key() {
        Some(key) => anyhow::anyhow!("{error} [{key}]"),
        None => anyhow::Error::new(error),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{memory_backend, quiet_output};
    use super::*;

    #[test]
    fn session_falls_back_to_anonymous_for_non_users() {
        let dir = tempfile::tempdir().unwrap();
        let backend = memory_backend(dir.path());
        let output = quiet_output();

        let session = session_for(backend.host(), Some(Guid::new(20)), &output).unwrap();
        assert!(session.user().is_none());

        let session = session_for(backend.host(), Some(Guid::new(1)), &output).unwrap();
        assert_eq!(session.user().map(|user| user.guid), Some(Guid::new(1)));

        assert!(session_for(backend.host(), None, &output).unwrap().user().is_none());
    }

    #[test]
    fn report_names_the_message_key() {
        let err = report(SetsError::CannotEdit {
            user: Guid::new(2),
            set: Guid::new(20),
        });
        assert_eq!(err.to_string(), "user 2 cannot edit set 20 [au_sets:error:cannot:edit]");
    }
}
