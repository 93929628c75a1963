//! Library Session Resolver

use crate::error::ResolveError;
use crate::merge::{apply_exercise_overrides, apply_session_overrides};
use crate::Resolver;
use regimen_model::{
    ClientSessionOverride, ResolutionGap, Resolved, ResolvedSession, SessionOverride,
};
use regimen_store::DocumentStore;

/// Where a library session is being resolved from. Locates the legacy
/// program-level override document.
#[derive(Debug, Clone, Copy)]
pub struct SessionScope<'a> {
    pub program_id: &'a str,
    pub program_module_id: &'a str,
    pub program_session_id: &'a str,
}

impl<S: DocumentStore> Resolver<S> {
    /// Resolves one library session with its exercises and sets, then layers
    /// program and client overrides on top.
    ///
    /// A missing library session is fatal ([`ResolveError::SessionNotFound`]).
    /// When `program_overrides` is `None` and legacy lookups are enabled, the
    /// `overrides/data` document under the program session is read instead;
    /// failing to read it only records a gap.
    #[tracing::instrument(
        level = "debug",
        skip(self, scope, program_overrides, client),
        fields(program_id = %scope.program_id)
    )]
    pub async fn resolve_library_session(
        &self,
        creator_id: &str,
        library_session_ref: &str,
        scope: SessionScope<'_>,
        program_overrides: Option<&SessionOverride>,
        client: Option<&ClientSessionOverride>,
    ) -> Result<Resolved<ResolvedSession>, ResolveError> {
        let library = self
            .fetch_library_session(creator_id, library_session_ref)
            .await?
            .require(|session_id| ResolveError::SessionNotFound {
                creator_id: creator_id.to_string(),
                session_id,
            })?;

        let exercises_path = self.layout.library_exercises(creator_id, library_session_ref)?;
        let (exercises, legacy) = futures::join!(
            self.fetch_exercises(&exercises_path),
            self.legacy_program_overrides(scope, program_overrides.is_none()),
        );

        let mut resolved = Resolved::complete(());
        let exercises = resolved.absorb(exercises?);
        let legacy = resolved.absorb(legacy?);

        let mut session = ResolvedSession::from_library(library, exercises);
        session.library_session_ref = Some(library_session_ref.to_string());

        let program_tier = program_overrides.or(legacy.as_ref());
        let client_tier = client.map(SessionOverride::from_client_session);
        let tiers: Vec<&SessionOverride> = client_tier.iter().chain(program_tier).collect();
        apply_session_overrides(&mut session, &tiers);

        if let Some(client) = client {
            apply_exercise_overrides(&mut session.exercises, &client.exercises);
        }

        Ok(resolved.map(|()| session))
    }

    async fn legacy_program_overrides(
        &self,
        scope: SessionScope<'_>,
        wanted: bool,
    ) -> Result<Resolved<Option<SessionOverride>>, ResolveError> {
        if !wanted || !self.config.legacy_program_overrides {
            return Ok(Resolved::complete(None));
        }
        let path = self.layout.program_session_overrides(
            scope.program_id,
            scope.program_module_id,
            scope.program_session_id,
        )?;

        let read = match self.store.get_doc(&path).await {
            Ok(Some(doc)) => doc.decode::<SessionOverride>().map(Some),
            Ok(None) => Ok(None),
            Err(error) => Err(error),
        };
        match read {
            Ok(overrides) => Ok(Resolved::complete(overrides)),
            Err(error) => {
                tracing::warn!(
                    path = %path,
                    error = %error,
                    "program session overrides unavailable"
                );
                let gap = ResolutionGap::ProgramOverridesUnavailable {
                    path: path.to_string(),
                    reason: error.to_string(),
                };
                Ok(Resolved::with_gaps(None, vec![gap]))
            }
        }
    }
}
