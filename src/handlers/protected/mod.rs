// handlers/protected/mod.rs - Protected handlers (Bearer access token required)
//
// Every handler receives the caller's `AuthUser` from the session middleware
// and derives an `OwnerScope` from it; notebooks and notes are only ever
// reached through that scope.

pub mod me;        // Caller's own account
pub mod notebooks; // Notebook CRUD, counts, export
pub mod notes;     // Note CRUD, listing, pagination, export

use axum::{
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use crate::services::ExportedPdf;

/// Relay a rendered PDF to the client unchanged.
pub(crate) fn pdf_response(pdf: ExportedPdf) -> Response {
    (
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (CONTENT_DISPOSITION, pdf.content_disposition),
        ],
        pdf.bytes,
    )
        .into_response()
}
