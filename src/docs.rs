//! OpenAPI document generated from the `#[utoipa::path]` annotations on the
//! handlers, served with Swagger UI at `/docs`.

use utoipa::{
    openapi::{
        security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
        Components,
    },
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{admin, protected, public};

pub const OPENAPI_PATH: &str = "/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MathGenius API",
        description = "Curriculum taxonomy, accounts and learning progress"
    ),
    paths(
        public::system::health,
        // Auth
        public::auth::current, public::auth::signin, public::auth::signup, protected::session::signout,
        // Users
        admin::users::list_users, protected::users::update_profile, protected::users::change_password,
        // Subjects
        public::curriculum::list_subjects, public::curriculum::get_subject,
        admin::curriculum::create_subject, admin::curriculum::update_subject,
        admin::curriculum::soft_delete_subject, admin::curriculum::hard_delete_subject,
        // Topics
        public::curriculum::list_topics, public::curriculum::get_topic,
        admin::curriculum::create_topic, admin::curriculum::update_topic,
        admin::curriculum::soft_delete_topic, admin::curriculum::hard_delete_topic,
        // Subtopics
        public::curriculum::list_subtopics, public::curriculum::get_subtopic,
        admin::curriculum::create_subtopic, admin::curriculum::update_subtopic, admin::curriculum::hard_delete_subtopic,
        // Modules
        public::curriculum::list_modules, public::curriculum::get_module,
        admin::curriculum::create_module, admin::curriculum::update_module, admin::curriculum::hard_delete_module,
        // Concepts and their relationship edges
        public::curriculum::list_concepts, public::curriculum::get_concept,
        admin::curriculum::create_concept, admin::curriculum::update_concept, admin::curriculum::hard_delete_concept,
        public::curriculum::list_relationships,
        admin::relationships::create_relationship, admin::relationships::delete_relationship,
        // Formulas
        public::curriculum::list_formulas, public::curriculum::get_formula,
        admin::curriculum::create_formula, admin::curriculum::update_formula, admin::curriculum::hard_delete_formula,
        // Exercises
        public::curriculum::list_exercises, public::curriculum::get_exercise,
        admin::curriculum::create_exercise, admin::curriculum::update_exercise, admin::curriculum::hard_delete_exercise,
        // Progress
        protected::progress::record_attempt, protected::progress::report,
    ),
    modifiers(&SessionAuth),
    tags(
        (name = "System", description = "Health check"),
        (name = "Auth", description = "Sign-in, sign-up and the session cookie"),
        (name = "Users", description = "Profiles and the admin user list"),
        (name = "Subjects", description = "Top of the curriculum tree"),
        (name = "Topics", description = "Ordered topics within a subject"),
        (name = "Subtopics", description = "Ordered subtopics within a topic"),
        (name = "Modules", description = "Lessons within a subtopic"),
        (name = "Concepts", description = "Concepts and the relationships between them"),
        (name = "Formulas", description = "Formulas attached to a concept"),
        (name = "Exercises", description = "Graded questions within a module"),
        (name = "Progress", description = "Attempts, mastery and completion")
    )
)]
pub struct ApiDoc;

/// The session travels either as the `token` cookie or as a bearer token.
struct SessionAuth;

impl Modify for SessionAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Components::new);
        components.add_security_scheme("cookieAuth", SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("token"))));
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url(OPENAPI_PATH, ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented_once() {
        let doc = ApiDoc::openapi();
        let operations: usize = doc
            .paths
            .paths
            .values()
            .map(|item| item.operations.len())
            .sum();
        assert_eq!(operations, 50);
        assert!(doc.paths.paths.contains_key("/concepts/{id}/relationships"));
        assert!(doc.paths.paths.contains_key("/subjects/soft/{id}"));
    }

    #[test]
    fn session_schemes_are_registered() {
        let doc = ApiDoc::openapi();
        let schemes = doc.components.map(|c| c.security_schemes).unwrap_or_default();
        assert!(schemes.contains_key("cookieAuth"));
        assert!(schemes.contains_key("bearerAuth"));
    }
}
