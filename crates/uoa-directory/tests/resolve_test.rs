use uoa_core::constants::{STAFF_GROUP, STUDENT_GROUP};
use uoa_core::{AppError, AttributeMap, HierarchyRow, OrgHierarchy, PersonResolver};
use uoa_directory::{lookup_person, resolve_all, Directory, InMemoryDirectory};

fn unit_dn(code: &str) -> String {
    format!("CN={}.uos,OU=uos,OU=Groups,DC=UoA,DC=auckland,DC=ac,DC=nz", code)
}

fn hierarchy() -> OrgHierarchy {
    OrgHierarchy::build(
        vec![
            HierarchyRow::new("UOA")
                .level("SCI", "Faculty of Science")
                .level("CS", "Computer Science"),
            HierarchyRow::new("UOA")
                .level("SCI", "Faculty of Science")
                .level("MATHS", "Mathematics"),
            HierarchyRow::new("UOA").level("ENG", "Faculty of Engineering"),
        ],
        "University of Auckland",
    )
    .unwrap()
}

fn directory() -> InMemoryDirectory {
    let cs = unit_dn("CS");
    let sci = unit_dn("SCI");
    let eng = unit_dn("ENG");
    [
        AttributeMap::with_dn("CN=abcd123,OU=People")
            .with("cn", &["abcd123"])
            .with("givenName", &["Ada"])
            .with("sn", &["Lovelace"])
            .with("displayName", &["Ada Lovelace"])
            .with("mail", &["ada@auckland.ac.nz"])
            .with("department", &["Computer Science"])
            .with("memberOf", &[cs.as_str(), sci.as_str(), STAFF_GROUP]),
        AttributeMap::with_dn("CN=efgh456,OU=People")
            .with("cn", &["efgh456"])
            .with("givenName", &["Grace"])
            .with("displayName", &["Grace Hopper"])
            .with("memberOf", &[eng.as_str(), STUDENT_GROUP, STAFF_GROUP]),
        AttributeMap::with_dn("CN=broken1,OU=People")
            .with("cn", &["broken1"])
            .with("displayName", &["Broken Record"])
            .with("memberOf", &[STAFF_GROUP]),
        AttributeMap::with_dn("CN=twin,OU=People")
            .with("cn", &["twin"])
            .with("givenName", &["One"]),
        AttributeMap::with_dn("CN=twin,OU=Alumni")
            .with("cn", &["twin"])
            .with("givenName", &["Two"]),
    ]
    .into_iter()
    .collect()
}

#[tokio::test]
async fn lookup_resolves_roles_and_highest_affiliations() {
    let hierarchy = hierarchy();
    let resolver = PersonResolver::new(&hierarchy);
    let directory = directory();

    let person = lookup_person(&directory, &resolver, "abcd123").await.unwrap();

    assert_eq!(person.first_name, "Ada");
    assert_eq!(person.last_name, "Lovelace");
    assert_eq!(person.department, "Computer Science");
    assert_eq!(person.federated_username(), "abcd123@auckland.ac.nz");
    assert!(person.roles.staff);
    assert!(!person.roles.student);

    let codes: Vec<&str> = person.affiliations().map(|unit| unit.id()).collect();
    assert_eq!(codes, ["SCI"]);
}

#[tokio::test]
async fn lookup_applies_fallbacks() {
    let hierarchy = hierarchy();
    let resolver = PersonResolver::new(&hierarchy);

    let person = lookup_person(&directory(), &resolver, "efgh456").await.unwrap();

    assert_eq!(person.last_name, "n/a");
    assert_eq!(person.email, "efgh456@aucklanduni.ac.nz");
    assert_eq!(person.department, "n/a");
    assert!(person.roles.staff && person.roles.student);
}

#[tokio::test]
async fn lookup_unknown_identifier_is_not_found() {
    let hierarchy = hierarchy();
    let resolver = PersonResolver::new(&hierarchy);

    let err = lookup_person(&directory(), &resolver, "zzzz999")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn lookup_duplicate_identifier_is_ambiguous() {
    let hierarchy = hierarchy();
    let resolver = PersonResolver::new(&hierarchy);

    let err = lookup_person(&directory(), &resolver, "twin").await.unwrap_err();
    assert!(matches!(err, AppError::Ambiguous(_)));
}

#[tokio::test]
async fn lookup_record_without_given_name_fails() {
    let hierarchy = hierarchy();
    let resolver = PersonResolver::new(&hierarchy);

    let err = lookup_person(&directory(), &resolver, "broken1")
        .await
        .unwrap_err();
    match err {
        AppError::MissingAttribute { attribute, record } => {
            assert_eq!(attribute, "givenName");
            assert_eq!(record, "broken1");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn group_members_resolve_skipping_broken_records() {
    let hierarchy = hierarchy();
    let resolver = PersonResolver::new(&hierarchy);
    let directory = directory();

    let records = directory.members_of_group(STAFF_GROUP).await.unwrap();
    assert_eq!(records.len(), 3);

    let people = resolve_all(&resolver, &records);
    let ids: Vec<&str> = people.iter().map(|p| p.identifier.as_str()).collect();
    assert_eq!(ids, ["abcd123", "efgh456"]);
}

#[tokio::test]
async fn name_search_is_case_insensitive() {
    let hierarchy = hierarchy();
    let resolver = PersonResolver::new(&hierarchy);
    let directory = directory();

    let records = directory.search_by_name("hopper").await.unwrap();
    let people = resolve_all(&resolver, &records);
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].to_string(), "efgh456@auckland.ac.nz: Grace n/a");

    let codes: Vec<&str> = people[0].affiliations().map(|unit| unit.id()).collect();
    assert_eq!(codes, ["ENG"]);
}
