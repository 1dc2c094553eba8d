diesel::table! {
    notes (id) {
        id -> Text,
        content -> Text,
        opened_at -> Nullable<Timestamp>,
        created_at -> Timestamp,
    }
}
