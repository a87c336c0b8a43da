use crate::generator::naming::identifiers::to_identifier;

/// Method identifier of an operation: the explicit `operationId` when present,
/// otherwise one derived from the HTTP method and the path.
pub fn compute_stable_id<S>(method: S, path: S, operation_id: Option<S>) -> String
where
  S: AsRef<str>,
{
  to_identifier(&operation_id.map_or_else(|| generate_operation_id(method, path), |s| s.as_ref().to_string()))
}

/// `GET /pets/{petId}` becomes `get/pets/{petId}`, which normalizes to `getPetsPetId`.
pub(crate) fn generate_operation_id<S>(method: S, path: S) -> String
where
  S: AsRef<str>,
{
  format!("{}{}", method.as_ref().to_lowercase(), path.as_ref())
}
