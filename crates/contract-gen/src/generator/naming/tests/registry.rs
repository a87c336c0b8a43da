use crate::generator::naming::registry::NameRegistry;

#[test]
fn test_claim_appends_smallest_free_suffix() {
  let mut registry = NameRegistry::new();

  assert_eq!(registry.claim("Pet"), "Pet");
  assert_eq!(registry.claim("Pet"), "Pet2");
  assert_eq!(registry.claim("Pet"), "Pet3");
  assert_eq!(registry.claim("Owner"), "Owner");
  assert_eq!(registry.len(), 4);
}

#[test]
fn test_claim_skips_names_taken_literally() {
  let mut registry = NameRegistry::new();

  assert_eq!(registry.claim("Pet2"), "Pet2");
  assert_eq!(registry.claim("Pet"), "Pet");
  assert_eq!(registry.claim("Pet"), "Pet3");
}

#[test]
fn test_names_are_case_sensitive() {
  let mut registry = NameRegistry::new();

  assert!(registry.is_empty());
  assert_eq!(registry.claim("pet"), "pet");
  assert_eq!(registry.claim("Pet"), "Pet");
  assert!(registry.is_issued("pet"));
  assert!(!registry.is_issued("PET"));
}
