/**
 * API Route Handlers
 *
 * Every JSON endpoint under `/api`. All routes except register and login
 * require `Authorization: Bearer <token>`; that is enforced by the `AuthUser`
 * extractor in each handler's signature.
 *
 * # Routes
 *
 * ## Authentication
 * - `POST /api/auth/register`
 * - `POST /api/auth/login`
 *
 * ## Profile
 * - `GET /api/profile/me`, `PUT /api/profile/me`
 *
 * ## Connections
 * - `GET /api/connections/people`
 * - `POST /api/connections/request/{id}`, `accept/{id}`, `ignore/{id}`
 *
 * ## Direct Messages
 * - `GET /api/messages/{other_id}`
 * - `DELETE /api/messages/conversation/{other_id}`
 * - `DELETE /api/messages/{id}`
 *
 * ## Groups
 * - `GET /api/groups`, `POST /api/groups`
 * - `PUT /api/groups/{id}`, `DELETE /api/groups/{id}`
 * - `GET /api/groups/{id}/messages`, `GET /api/groups/{id}/members`
 * - `POST /api/groups/{id}/join`
 * - `POST /api/groups/{id}/approve/{user_id}`, `reject/{user_id}`,
 *   `add-member/{user_id}`, `remove-member/{user_id}`
 * - `DELETE /api/group-messages/{id}`
 */

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::backend::auth::{login, register};
use crate::backend::connections::{accept_request, ignore_request, list_people, send_request};
use crate::backend::groups::{
    add_member, approve_member, create_group, delete_group, delete_group_message, group_messages,
    join_group, list_groups, list_members, reject_member, remove_member, update_group,
};
use crate::backend::messaging::{delete_conversation, delete_message, get_conversation};
use crate::backend::profile::{get_me, update_me};
use crate::backend::server::state::AppState;

/// Configure API routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Authentication endpoints
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        // Profile
        .route("/api/profile/me", get(get_me).put(update_me))
        // Connections
        .route("/api/connections/people", get(list_people))
        .route("/api/connections/request/{id}", post(send_request))
        .route("/api/connections/accept/{id}", post(accept_request))
        .route("/api/connections/ignore/{id}", post(ignore_request))
        // Direct messages; the static `conversation` segment wins over `{id}`
        .route("/api/messages/conversation/{other_id}", delete(delete_conversation))
        .route("/api/messages/{id}", get(get_conversation).delete(delete_message))
        // Groups
        .route("/api/groups", get(list_groups).post(create_group))
        .route("/api/groups/{id}", put(update_group).delete(delete_group))
        .route("/api/groups/{id}/messages", get(group_messages))
        .route("/api/groups/{id}/members", get(list_members))
        .route("/api/groups/{id}/join", post(join_group))
        .route("/api/groups/{id}/approve/{user_id}", post(approve_member))
        .route("/api/groups/{id}/reject/{user_id}", post(reject_member))
        .route("/api/groups/{id}/add-member/{user_id}", post(add_member))
        .route("/api/groups/{id}/remove-member/{user_id}", post(remove_member))
        .route("/api/group-messages/{id}", delete(delete_group_message))
}
