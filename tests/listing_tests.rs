mod common;

use serde_json::json;

use common::{ids, user};
use userdash::listing::{
    self, query, ListParams, PageRequest, SortDirection, SortField, UserFilters, UserSorting,
};
use userdash::models::UserRecord;

fn sorting(field: &str, direction: SortDirection) -> Option<UserSorting> {
    Some(UserSorting::new(SortField::parse(field), direction))
}

fn root_ids(forest: &listing::Forest) -> Vec<i64> {
    forest.roots().map(|n| n.user().id).collect()
}

fn child_ids(forest: &listing::Forest, id: i64) -> Vec<i64> {
    forest
        .find(id)
        .map(|n| n.children().map(|c| c.user().id).collect())
        .unwrap_or_default()
}

// ── Filtering ───────────────────────────────────────────────────

#[test]
fn active_filter_accepts_every_truthy_wire_form() {
    let records: Vec<UserRecord> = [
        json!(true),
        json!("true"),
        json!(1),
        json!("1"),
        json!(false),
        json!("false"),
        json!(0),
        json!("yes"),
        json!(null),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, active)| {
        let id = i as i64 + 1;
        serde_json::from_value(json!({
            "id": id,
            "userType": "staff",
            "firstName": "User",
            "lastName": format!("{i}"),
            "email": format!("u{i}@example.com"),
            "isActive": active,
        }))
        .unwrap()
    })
    .collect();

    let active = UserFilters {
        is_active: Some(true),
        ..Default::default()
    };
    assert_eq!(ids(&listing::filter(&records, &active)), vec![1, 2, 3, 4]);

    let inactive = UserFilters {
        is_active: Some(false),
        ..Default::default()
    };
    assert_eq!(ids(&listing::filter(&records, &inactive)), vec![5, 6, 7, 8, 9]);
}

#[test]
fn missing_is_active_reads_as_inactive() {
    let record: UserRecord = serde_json::from_value(json!({
        "id": 1,
        "userType": "staff",
        "firstName": "A",
        "lastName": "B",
        "email": "a@example.com",
    }))
    .unwrap();
    assert!(!record.is_active);
}

#[test]
fn search_matches_name_or_email_case_insensitively() {
    let mut records = vec![
        user(1, "Jane Cooper", "admin", true, None, "2024-01-01T00:00:00Z"),
        user(2, "Cody Fisher", "manager", true, Some(1), "2024-01-02T00:00:00Z"),
        user(3, "Esther Howard", "staff", false, Some(1), "2024-01-03T00:00:00Z"),
    ];
    records[2].email = "ehoward@corp.test".to_string();

    let by_name = UserFilters {
        search: Some("COOPER".to_string()),
        ..Default::default()
    };
    assert_eq!(ids(&listing::filter(&records, &by_name)), vec![1]);

    let by_email = UserFilters {
        search: Some("corp.test".to_string()),
        ..Default::default()
    };
    assert_eq!(ids(&listing::filter(&records, &by_email)), vec![3]);

    // Across the first/last name boundary
    let full = UserFilters {
        search: Some("dy fi".to_string()),
        ..Default::default()
    };
    assert_eq!(ids(&listing::filter(&records, &full)), vec![2]);
}

#[test]
fn filters_combine_and_empty_values_are_ignored() {
    let records = vec![
        user(1, "Jane Cooper", "admin", true, None, "2024-01-01T00:00:00Z"),
        user(2, "Cody Fisher", "staff", true, Some(1), "2024-01-02T00:00:00Z"),
        user(3, "Esther Howard", "staff", false, Some(1), "2024-01-03T00:00:00Z"),
    ];

    let combined = UserFilters {
        search: None,
        user_type: Some("staff".to_string()),
        is_active: Some(true),
    };
    assert_eq!(ids(&listing::filter(&records, &combined)), vec![2]);

    let blank = UserFilters {
        search: Some(String::new()),
        user_type: Some(String::new()),
        is_active: None,
    };
    assert!(blank.is_empty());
    assert_eq!(ids(&listing::filter(&records, &blank)), vec![1, 2, 3]);
}

// ── Sorting ─────────────────────────────────────────────────────

#[test]
fn sort_is_stable_in_both_directions() {
    let records = vec![
        user(1, "Amy Adams", "staff", true, None, "2024-01-01T00:00:00Z"),
        user(2, "Bob Brown", "admin", true, None, "2024-01-01T00:00:00Z"),
        user(3, "Cat Cole", "staff", true, None, "2024-01-01T00:00:00Z"),
    ];

    let asc = listing::sort(&records, sorting("userType", SortDirection::Asc).as_ref());
    assert_eq!(ids(&asc), vec![2, 1, 3]);

    let desc = listing::sort(&records, sorting("userType", SortDirection::Desc).as_ref());
    assert_eq!(ids(&desc), vec![1, 3, 2]);
}

#[test]
fn sort_by_display_name_and_status() {
    let records = vec![
        user(1, "Zed Young", "staff", true, None, "2024-01-01T00:00:00Z"),
        user(2, "Abe Zane", "staff", false, None, "2024-01-01T00:00:00Z"),
        user(3, "Abe Allen", "staff", true, None, "2024-01-01T00:00:00Z"),
    ];

    let by_name = listing::sort(&records, sorting("user", SortDirection::Asc).as_ref());
    assert_eq!(ids(&by_name), vec![3, 2, 1]);

    // false < true
    let by_status = listing::sort(&records, sorting("isActive", SortDirection::Asc).as_ref());
    assert_eq!(ids(&by_status), vec![2, 1, 3]);
}

#[test]
fn created_at_compares_instants_and_unparseable_sorts_first() {
    let records = vec![
        user(1, "A A", "staff", true, None, "2024-01-02T00:00:00Z"),
        user(2, "B B", "staff", true, None, "not a date"),
        user(3, "C C", "staff", true, None, "2024-01-02T01:00:00+02:00"),
        user(4, "D D", "staff", true, None, "2023-12-31T23:59:59Z"),
    ];

    let asc = listing::sort(&records, sorting("createdAt", SortDirection::Asc).as_ref());
    // 3 is 2024-01-01T23:00Z, before 1
    assert_eq!(ids(&asc), vec![2, 4, 3, 1]);

    let desc = listing::sort(&records, sorting("createdAt", SortDirection::Desc).as_ref());
    assert_eq!(ids(&desc), vec![1, 3, 4, 2]);
}

#[test]
fn unknown_sort_field_or_no_sorting_keeps_input_order() {
    let records = vec![
        user(3, "C C", "staff", true, None, "2024-01-03T00:00:00Z"),
        user(1, "A A", "admin", true, None, "2024-01-01T00:00:00Z"),
        user(2, "B B", "viewer", true, None, "2024-01-02T00:00:00Z"),
    ];

    let unknown = listing::sort(&records, sorting("favouriteColour", SortDirection::Desc).as_ref());
    assert_eq!(ids(&unknown), vec![3, 1, 2]);
    assert_eq!(ids(&listing::sort(&records, None)), vec![3, 1, 2]);
}

#[test]
fn shape_filters_before_sorting() {
    let records = vec![
        user(1, "Jane Cooper", "admin", true, None, "2024-01-03T00:00:00Z"),
        user(2, "Cody Fisher", "staff", true, Some(1), "2024-01-01T00:00:00Z"),
        user(3, "Esther Howard", "staff", true, Some(1), "2024-01-02T00:00:00Z"),
    ];
    let params = ListParams {
        pagination: PageRequest::default(),
        sorting: sorting("createdAt", SortDirection::Desc),
        filters: UserFilters {
            user_type: Some("staff".to_string()),
            ..Default::default()
        },
    };
    assert_eq!(ids(&listing::shape(&records, &params)), vec![3, 2]);
}

// ── Pagination ──────────────────────────────────────────────────

#[test]
fn paginate_slices_one_based_pages() {
    let items: Vec<u32> = (1..=45).collect();

    assert_eq!(listing::paginate(&items, 1, 20), &items[0..20]);
    assert_eq!(listing::paginate(&items, 3, 20), &[41, 42, 43, 44, 45]);
    assert!(listing::paginate(&items, 4, 20).is_empty());
    assert!(listing::paginate(&items, usize::MAX, usize::MAX).is_empty());
    assert!(listing::paginate::<u32>(&[], 1, 20).is_empty());
}

#[test]
fn total_pages_rounds_up() {
    assert_eq!(listing::total_pages(0, 20), 0);
    assert_eq!(listing::total_pages(20, 20), 1);
    assert_eq!(listing::total_pages(21, 20), 2);
    assert_eq!(listing::total_pages(5, 0), 0);
}

// ── Hierarchy ───────────────────────────────────────────────────

#[test]
fn current_user_heads_the_forest_with_its_children() {
    let current = user(1, "Jane Cooper", "admin", true, None, "2024-01-01T00:00:00Z");
    let records = vec![
        user(2, "Cody Fisher", "manager", true, Some(1), "2024-01-02T00:00:00Z"),
        user(3, "Esther Howard", "staff", true, None, "2024-01-03T00:00:00Z"),
        current.clone(),
    ];

    let forest = listing::build(&records, Some(&current));
    assert_eq!(root_ids(&forest), vec![1, 3]);
    assert_eq!(child_ids(&forest, 1), vec![2]);
    assert_eq!(forest.len(), 3);
}

#[test]
fn current_user_is_added_when_absent_from_records() {
    let current = user(1, "Jane Cooper", "admin", true, None, "2024-01-01T00:00:00Z");
    let records = vec![
        user(2, "Cody Fisher", "manager", true, Some(1), "2024-01-02T00:00:00Z"),
        user(3, "Esther Howard", "staff", true, Some(1), "2024-01-03T00:00:00Z"),
    ];

    let forest = listing::build(&records, Some(&current));
    assert_eq!(root_ids(&forest), vec![1]);
    assert_eq!(child_ids(&forest, 1), vec![2, 3]);
    assert_eq!(forest.len(), 3);
}

#[test]
fn records_attach_to_known_creators_without_a_current_user() {
    let records = vec![
        user(4, "Jenny Wilson", "viewer", true, None, "2024-01-01T00:00:00Z"),
        user(22, "Ralph Edwards", "viewer", true, Some(4), "2024-01-02T00:00:00Z"),
        user(21, "Albert Flores", "staff", true, Some(99), "2024-01-03T00:00:00Z"),
    ];

    let forest = listing::build(&records, None);
    assert_eq!(root_ids(&forest), vec![4, 21]);
    assert_eq!(child_ids(&forest, 4), vec![22]);
}

#[test]
fn grandchildren_surface_as_extra_roots() {
    let current = user(1, "Jane Cooper", "admin", true, None, "2024-01-01T00:00:00Z");
    let records = vec![
        current.clone(),
        user(2, "Cody Fisher", "manager", true, Some(1), "2024-01-02T00:00:00Z"),
        user(11, "Robert Fox", "staff", true, Some(2), "2024-01-03T00:00:00Z"),
        user(5, "Leslie Alexander", "staff", true, None, "2024-01-04T00:00:00Z"),
    ];

    let forest = listing::build(&records, Some(&current));
    assert_eq!(root_ids(&forest), vec![1, 5, 11]);
    assert_eq!(child_ids(&forest, 1), vec![2]);
    assert!(child_ids(&forest, 2).is_empty());
}

#[test]
fn every_record_appears_exactly_once() {
    let current = user(1, "Jane Cooper", "admin", true, None, "2024-01-01T00:00:00Z");
    let records = vec![
        current.clone(),
        user(2, "Cody Fisher", "manager", true, Some(1), "2024-01-02T00:00:00Z"),
        user(3, "Esther Howard", "staff", true, Some(1), "2024-01-03T00:00:00Z"),
        user(4, "Jenny Wilson", "viewer", false, None, "2024-01-04T00:00:00Z"),
        user(11, "Robert Fox", "manager", true, Some(2), "2024-01-05T00:00:00Z"),
        user(21, "Albert Flores", "staff", true, Some(99), "2024-01-06T00:00:00Z"),
        user(22, "Ralph Edwards", "viewer", true, Some(4), "2024-01-07T00:00:00Z"),
        user(30, "Loop Self", "staff", true, Some(30), "2024-01-08T00:00:00Z"),
    ];

    let forest = listing::build(&records, Some(&current));
    let mut seen: Vec<i64> = forest.walk().iter().map(|(_, n)| n.user().id).collect();
    seen.sort();
    assert_eq!(seen, vec![1, 2, 3, 4, 11, 21, 22, 30]);
    assert!(forest.walk().iter().all(|(depth, _)| *depth <= 1));
}

#[test]
fn self_created_record_is_a_root() {
    let records = vec![user(7, "Self Made", "staff", true, Some(7), "2024-01-01T00:00:00Z")];
    let forest = listing::build(&records, None);
    assert_eq!(root_ids(&forest), vec![7]);
    assert_eq!(forest.find(7).unwrap().child_count(), 0);
}

#[test]
fn legacy_parent_id_links_like_created_by() {
    let current = user(1, "Jane Cooper", "admin", true, None, "2024-01-01T00:00:00Z");
    let legacy: UserRecord = serde_json::from_value(json!({
        "id": 12,
        "userType": "staff",
        "firstName": "Jacob",
        "lastName": "Jones",
        "email": "jacob@example.com",
        "isActive": "1",
        "parentId": 1,
    }))
    .unwrap();

    let forest = listing::build(&[legacy], Some(&current));
    assert_eq!(child_ids(&forest, 1), vec![12]);
}

#[test]
fn duplicate_ids_keep_the_first_record() {
    let records = vec![
        user(2, "First Copy", "staff", true, None, "2024-01-01T00:00:00Z"),
        user(2, "Second Copy", "staff", true, None, "2024-01-02T00:00:00Z"),
    ];
    let forest = listing::build(&records, None);
    assert_eq!(forest.len(), 1);
    assert_eq!(forest.find(2).unwrap().user().first_name, "First");
}

#[test]
fn walk_and_owned_nodes_follow_root_order() {
    let current = user(1, "Jane Cooper", "admin", true, None, "2024-01-01T00:00:00Z");
    let records = vec![
        user(2, "Cody Fisher", "manager", true, Some(1), "2024-01-02T00:00:00Z"),
        user(3, "Esther Howard", "staff", true, None, "2024-01-03T00:00:00Z"),
    ];
    let forest = listing::build(&records, Some(&current));

    let walked: Vec<(usize, i64)> = forest.walk().iter().map(|(d, n)| (*d, n.user().id)).collect();
    assert_eq!(walked, vec![(0, 1), (1, 2), (0, 3)]);

    let json = serde_json::to_value(forest.to_nodes()).unwrap();
    assert_eq!(json[0]["id"], 1);
    assert_eq!(json[0]["firstName"], "Jane");
    assert_eq!(json[0]["children"][0]["id"], 2);
    assert_eq!(json[1]["children"], json!([]));
}

#[test]
fn empty_input_builds_empty_forest() {
    let forest = listing::build(&[], None);
    assert!(forest.is_empty());
    assert_eq!(forest.root_count(), 0);
}

// ── Query codec ─────────────────────────────────────────────────

#[test]
fn defaults_encode_to_an_empty_query() {
    assert_eq!(ListParams::default().to_query(), "");
}

#[test]
fn full_state_survives_the_url() {
    let params = ListParams {
        pagination: PageRequest { page: 2, limit: 50 },
        sorting: sorting("createdAt", SortDirection::Desc),
        filters: UserFilters {
            search: Some("ann lee".to_string()),
            user_type: Some("admin".to_string()),
            is_active: Some(false),
        },
    };

    let encoded = params.to_query();
    assert_eq!(
        encoded,
        "page=2&limit=50&sortBy=createdAt&sortOrder=desc&search=ann+lee&userType=admin&isActive=false"
    );
    assert_eq!(ListParams::from_query(&encoded), params);
    assert_eq!(ListParams::from_query(&format!("?{encoded}")), params);
}

#[test]
fn remote_query_omits_paging() {
    let filters = UserFilters {
        is_active: Some(true),
        ..Default::default()
    };
    let encoded = query::encode_remote(sorting("user", SortDirection::Asc).as_ref(), &filters);
    assert_eq!(encoded, "sortBy=user&sortOrder=asc&isActive=true");
}

#[test]
fn bad_page_and_limit_fall_back_to_defaults() {
    let (page, _, _) = query::decode("page=0&limit=abc");
    assert_eq!(page, PageRequest::default());

    let (page, _, _) = query::decode("page=-3&limit=0");
    assert_eq!(page, PageRequest::default());
}

#[test]
fn one_character_search_is_ignored() {
    let (_, _, filters) = query::decode("search=a");
    assert_eq!(filters.search, None);

    let (_, _, filters) = query::decode("search=ab");
    assert_eq!(filters.search.as_deref(), Some("ab"));
}

#[test]
fn role_is_accepted_for_user_type() {
    let (_, _, filters) = query::decode("role=manager");
    assert_eq!(filters.user_type.as_deref(), Some("manager"));

    let (_, _, filters) = query::decode("role=admin&userType=staff");
    assert_eq!(filters.user_type.as_deref(), Some("staff"));

    let (_, _, filters) = query::decode("userType=all");
    assert_eq!(filters.user_type, None);
}

#[test]
fn is_active_is_three_state() {
    assert_eq!(query::decode("").2.is_active, None);
    assert_eq!(query::decode("isActive=true").2.is_active, Some(true));
    assert_eq!(query::decode("isActive=false").2.is_active, Some(false));
    assert_eq!(query::decode("isActive=yes").2.is_active, Some(false));
}

#[test]
fn sort_order_defaults_to_ascending() {
    let (_, sorting, _) = query::decode("sortBy=favouriteColour");
    let sorting = sorting.unwrap();
    assert_eq!(sorting.field, SortField::Other("favouriteColour".to_string()));
    assert_eq!(sorting.direction, SortDirection::Asc);

    let (_, sorting, _) = query::decode("sortOrder=desc");
    assert_eq!(sorting, None);
}
