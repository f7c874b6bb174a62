//! ManagedMachinePool Admission Handlers
//!
//! Handles AdmissionReview requests for ManagedMachinePool resources:
//! defaulting on the mutating path, create/update validation on the
//! validating path.

use std::sync::Arc;

use axum::{extract::State, Json};
use kube::{
    core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation},
    core::DynamicObject,
};
use tracing::{debug, error, info, warn};

use crate::crd::ManagedMachinePool;
use crate::Error;

use super::WebhookState;

const KIND: &str = "ManagedMachinePool";

/// Handle mutating admission review for ManagedMachinePools
pub async fn mutate_handler(
    State(state): State<Arc<WebhookState>>,
    Json(body): Json<AdmissionReview<DynamicObject>>,
) -> Json<AdmissionReview<DynamicObject>> {
    let req: AdmissionRequest<DynamicObject> = match body.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Failed to parse admission request");
            return Json(AdmissionResponse::invalid(e.to_string()).into_review());
        }
    };

    Json(mutate_pool(&state, &req).into_review())
}

/// Handle validating admission review for ManagedMachinePools
pub async fn validate_handler(
    State(state): State<Arc<WebhookState>>,
    Json(body): Json<AdmissionReview<DynamicObject>>,
) -> Json<AdmissionReview<DynamicObject>> {
    let req: AdmissionRequest<DynamicObject> = match body.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Failed to parse admission request");
            return Json(AdmissionResponse::invalid(e.to_string()).into_review());
        }
    };

    Json(validate_pool(&state, &req).into_review())
}

/// Default a pool on create and answer with the resulting JSON patch
fn mutate_pool(
    state: &WebhookState,
    request: &AdmissionRequest<DynamicObject>,
) -> AdmissionResponse {
    let uid = &request.uid;

    if !matches!(request.operation, Operation::Create) {
        debug!(uid = %uid, operation = ?request.operation, "Defaulting only runs on create");
        return AdmissionResponse::from(request);
    }

    let original = match parse_pool(request.object.as_ref(), request) {
        Ok(pool) => pool,
        Err(e) => {
            warn!(uid = %uid, error = %e, "Unparseable ManagedMachinePool");
            return AdmissionResponse::from(request).deny(e.to_string());
        }
    };

    let identity = original
        .metadata
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| request.name.clone());

    let mut defaulted = original.clone();
    state.admission.default(&mut defaulted, &identity);

    let patch = match default_patch(&original, &defaulted) {
        Ok(patch) => patch,
        Err(e) => {
            error!(uid = %uid, error = %e, "Failed to compute default patch");
            return AdmissionResponse::from(request).deny(e.to_string());
        }
    };

    info!(
        uid = %uid,
        pool = %identity,
        patch_ops = patch.0.len(),
        "Defaulted ManagedMachinePool"
    );

    match AdmissionResponse::from(request).with_patch(patch) {
        Ok(response) => response,
        Err(e) => {
            error!(uid = %uid, error = %e, "Failed to serialize patch");
            AdmissionResponse::from(request).deny(format!("patch serialization error: {e}"))
        }
    }
}

/// Run create or update validation depending on the operation
fn validate_pool(
    state: &WebhookState,
    request: &AdmissionRequest<DynamicObject>,
) -> AdmissionResponse {
    let uid = &request.uid;

    let result = match request.operation {
        Operation::Create => match parse_pool(request.object.as_ref(), request) {
            Ok(pool) => state.admission.validate_create(&pool),
            Err(e) => Err(e),
        },
        Operation::Update => parse_pool(request.object.as_ref(), request).and_then(|new| {
            let old = parse_pool(request.old_object.as_ref(), request)?;
            state.admission.validate_update(&new, &old)
        }),
        Operation::Delete | Operation::Connect => {
            debug!(uid = %uid, operation = ?request.operation, "No validation for operation");
            return AdmissionResponse::from(request);
        }
    };

    match result {
        Ok(()) => {
            debug!(
                uid = %uid,
                name = %request.name,
                operation = ?request.operation,
                "Admitted ManagedMachinePool"
            );
            AdmissionResponse::from(request)
        }
        Err(e) if e.is_rejection() => {
            info!(
                uid = %uid,
                name = %request.name,
                violations = e.violations().len(),
                "Denied ManagedMachinePool"
            );
            AdmissionResponse::from(request).deny(e.to_string())
        }
        Err(e) => {
            error!(uid = %uid, name = %request.name, error = %e, "Validation could not complete");
            AdmissionResponse::from(request).deny(e.to_string())
        }
    }
}

/// Parse a ManagedMachinePool out of a review object
///
/// The namespace and name are filled in from the request when the object
/// itself does not carry them (generateName, namespace implied by the URL).
fn parse_pool(
    object: Option<&DynamicObject>,
    request: &AdmissionRequest<DynamicObject>,
) -> Result<ManagedMachinePool, Error> {
    let object = object.ok_or_else(|| {
        Error::serialization_for(KIND, format!("{:?} request has no object", request.operation))
    })?;

    let mut pool: ManagedMachinePool = object
        .clone()
        .try_parse()
        .map_err(|e| Error::serialization_for(KIND, e.to_string()))?;

    if pool.metadata.namespace.is_none() {
        pool.metadata.namespace = request.namespace.clone();
    }
    if pool.metadata.name.is_none() && !request.name.is_empty() {
        pool.metadata.name = Some(request.name.clone());
    }

    Ok(pool)
}

/// Build the JSON patch turning `original` into `defaulted`
fn default_patch(
    original: &ManagedMachinePool,
    defaulted: &ManagedMachinePool,
) -> Result<json_patch::Patch, Error> {
    let before = serde_json::to_value(original)
        .map_err(|e| Error::serialization_for(KIND, e.to_string()))?;
    let after = serde_json::to_value(defaulted)
        .map_err(|e| Error::serialization_for(KIND, e.to_string()))?;
    Ok(json_patch::diff(&before, &after))
}
