//! Override merge functions
//!
//! Pure functions combining library, program and client tiers. Precedence
//! for scalar fields is always client > program > library, with presence
//! decided by [`ScalarField::presence`]. Structural rules:
//!
//! - the program tier may add sessions to a module;
//! - the client tier only modifies sessions, exercises and sets that already
//!   exist; unmatched keys are ignored.

use regimen_model::{
    merge_fields, precedence, ClientExerciseOverride, ClientModuleOverride,
    ClientProgramOverrides, Exercise, FieldOverride, ProgramModule, ProgramSession,
    ProgramTemplate, ResolvedModule, ResolvedProgram, ResolvedSession, ScalarField,
    SessionOverride,
};
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// Session Level
// ============================================================================

/// Applies scalar override tiers (highest priority first) onto `session`.
/// Fields no tier sets keep the session's current value.
pub fn apply_session_overrides(session: &mut ResolvedSession, tiers: &[&SessionOverride]) {
    if let FieldOverride::Set(title) =
        precedence(ScalarField::Title, tiers.iter().map(|t| t.title.clone()))
    {
        session.title = title;
    }
    if let FieldOverride::Set(description) = precedence(
        ScalarField::Description,
        tiers.iter().map(|t| t.description.clone()),
    ) {
        session.description = description;
    }
    if let FieldOverride::Set(image_url) =
        precedence(ScalarField::ImageUrl, tiers.iter().map(|t| t.image_url.clone()))
    {
        session.image_url = image_url;
    }
    if let FieldOverride::Set(order) =
        precedence(ScalarField::Order, tiers.iter().map(|t| t.order.clone()))
    {
        session.order = order;
    }
}

/// Shallow-merges client exercise and set patches into matching entries.
pub fn apply_exercise_overrides(
    exercises: &mut [Exercise],
    overrides: &BTreeMap<String, ClientExerciseOverride>,
) {
    if overrides.is_empty() {
        return;
    }
    for exercise in exercises.iter_mut() {
        let Some(patch) = overrides.get(&exercise.id) else {
            continue;
        };
        merge_fields(&mut exercise.fields, &patch.fields);
        for set in exercise.sets.iter_mut() {
            if let Some(set_patch) = patch.sets.get(&set.id) {
                merge_fields(&mut set.fields, set_patch);
            }
        }
    }
}

/// A program session taken as a full session body (standalone modules, and
/// sessions a program adds to a library module).
pub fn program_session_to_resolved(session: &ProgramSession) -> ResolvedSession {
    let mut resolved = ResolvedSession {
        id: session.key().unwrap_or_default().to_string(),
        library_session_ref: session.library_session_ref.clone(),
        title: None,
        description: None,
        image_url: None,
        order: None,
        version: None,
        exercises: session.exercises.clone().unwrap_or_default(),
        extra: session.extra.clone(),
    };
    let own = SessionOverride::from_program_session(session);
    match &session.overrides {
        Some(block) => apply_session_overrides(&mut resolved, &[block, &own]),
        None => apply_session_overrides(&mut resolved, &[&own]),
    }
    resolved
}

/// Program tier merged into an existing session entry.
fn merge_program_session(existing: &mut ResolvedSession, session: &ProgramSession) {
    let own = SessionOverride::from_program_session(session);
    match &session.overrides {
        Some(block) => apply_session_overrides(existing, &[block, &own]),
        None => apply_session_overrides(existing, &[&own]),
    }
    if let Some(library_ref) = session.library_ref() {
        existing.library_session_ref = Some(library_ref.to_string());
    }
    if let Some(exercises) = &session.exercises {
        existing.exercises = exercises.clone();
    }
    merge_fields(&mut existing.extra, &session.extra);
}

// ============================================================================
// Module Level
// ============================================================================

/// Sessions in first-seen order, addressable by merge key or by the library
/// session they are backed by.
#[derive(Default)]
struct SessionTable {
    order: Vec<ResolvedSession>,
    by_key: HashMap<String, usize>,
    by_library_ref: HashMap<String, usize>,
}

impl SessionTable {
    fn key_of(session: &ResolvedSession) -> &str {
        if session.id.is_empty() {
            session.library_session_ref.as_deref().unwrap_or_default()
        } else {
            &session.id
        }
    }

    fn push(&mut self, session: ResolvedSession) {
        let slot = self.order.len();
        let key = Self::key_of(&session);
        if !key.is_empty() {
            self.by_key.entry(key.to_string()).or_insert(slot);
        }
        if let Some(library_ref) = session.library_session_ref.as_deref().filter(|r| !r.is_empty()) {
            self.by_library_ref.entry(library_ref.to_string()).or_insert(slot);
        }
        self.order.push(session);
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut ResolvedSession> {
        let slot = *self.by_key.get(key)?;
        self.order.get_mut(slot)
    }

    /// Matches by merge key first, then by `librarySessionRef`, the same
    /// rule the session resolver uses to pick a program session.
    fn program_match(&mut self, session: &ProgramSession) -> Option<&mut ResolvedSession> {
        let slot = session
            .key()
            .and_then(|key| self.by_key.get(key))
            .or_else(|| {
                let library_ref = session.library_ref()?;
                self.by_key
                    .get(library_ref)
                    .or_else(|| self.by_library_ref.get(library_ref))
            })
            .copied()?;
        self.order.get_mut(slot)
    }

    fn into_sessions(self) -> Vec<ResolvedSession> {
        self.order
    }
}

/// Merges a module's three tiers.
///
/// `library` is `None` for standalone modules, in which case the program
/// module is the base.
///
/// | Field              | Source                                      |
/// |--------------------|---------------------------------------------|
/// | `id`               | program                                     |
/// | `libraryModuleRef` | program                                     |
/// | `title`            | client > program > library (truthy)         |
/// | `order`            | program, else library                       |
/// | `version`          | library                                     |
/// | other fields       | library, then program, then client on top   |
/// | `sessions`         | library order, program merges/appends, client modifies |
pub fn merge_module_overrides(
    library: Option<ResolvedModule>,
    program: &ProgramModule,
    client: Option<&ClientModuleOverride>,
) -> ResolvedModule {
    let (library_title, library_order, version, mut extra, library_sessions) = match library {
        Some(module) => (
            module.title,
            module.order,
            module.version,
            module.extra,
            module.sessions,
        ),
        None => (None, None, None, Default::default(), Vec::new()),
    };

    let client_title = client.map(|c| c.title.clone()).unwrap_or_default();
    let program_title = FieldOverride::from(program.title.clone().map(Some));
    let title = precedence(ScalarField::Title, [client_title, program_title])
        .unwrap_or(library_title);

    merge_fields(&mut extra, &program.extra);
    if let Some(client) = client {
        merge_fields(&mut extra, &client.extra);
    }

    let mut table = SessionTable::default();
    for session in library_sessions {
        table.push(session);
    }
    for session in program.sessions() {
        match table.program_match(session) {
            Some(existing) => merge_program_session(existing, session),
            None => table.push(program_session_to_resolved(session)),
        }
    }
    if let Some(client) = client {
        for (session_id, patch) in &client.sessions {
            let Some(existing) = table.get_mut(session_id) else {
                tracing::debug!(
                    module_id = %program.id,
                    session_id = %session_id,
                    "ignoring client override for unknown session"
                );
                continue;
            };
            let scalars = SessionOverride::from_client_session(patch);
            apply_session_overrides(existing, &[&scalars]);
            apply_exercise_overrides(&mut existing.exercises, &patch.exercises);
        }
    }

    ResolvedModule {
        id: program.id.clone(),
        library_module_ref: program.library_module_ref.clone(),
        title,
        order: program.order.or(library_order),
        version,
        sessions: table.into_sessions(),
        extra,
    }
}

/// A program module passed through untouched by any override tier.
pub fn program_module_to_resolved(module: &ProgramModule) -> ResolvedModule {
    ResolvedModule {
        id: module.id.clone(),
        library_module_ref: module.library_module_ref.clone(),
        title: module.title.clone(),
        order: module.order,
        version: None,
        sessions: module
            .sessions()
            .iter()
            .map(program_session_to_resolved)
            .collect(),
        extra: module.extra.clone(),
    }
}

// ============================================================================
// Program Level
// ============================================================================

/// Root-level merge used when library content cannot be resolved: client
/// `title`, `description` and `image_url` over the template; modules pass
/// through unchanged.
pub fn merge_program_overrides(
    template: &ProgramTemplate,
    client: Option<&ClientProgramOverrides>,
) -> ResolvedProgram {
    let mut program = program_to_resolved(template, Vec::new());
    program.modules = template
        .modules
        .iter()
        .map(program_module_to_resolved)
        .collect();

    if let Some(client) = client {
        if let FieldOverride::Set(title) = precedence(ScalarField::Title, [client.title.clone()]) {
            program.title = title;
        }
        if let FieldOverride::Set(description) =
            precedence(ScalarField::Description, [client.description.clone()])
        {
            program.description = description;
        }
        if let FieldOverride::Set(image_url) =
            precedence(ScalarField::ImageUrl, [client.image_url.clone()])
        {
            program.image_url = image_url;
        }
    }
    program
}

/// The template's root fields around an already resolved module list.
pub fn program_to_resolved(template: &ProgramTemplate, modules: Vec<ResolvedModule>) -> ResolvedProgram {
    ResolvedProgram {
        id: template.id.clone(),
        creator_id: template.creator_id.clone(),
        title: template.title.clone(),
        description: template.description.clone(),
        image_url: template.image_url.clone(),
        modules,
        extra: template.extra.clone(),
    }
}
