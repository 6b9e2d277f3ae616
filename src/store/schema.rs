diesel::table! {
    plans (id) {
        id -> BigInt,
        name -> Text,
        status -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    steps (id) {
        id -> BigInt,
        plan_id -> BigInt,
        title -> Text,
        owner -> Nullable<Text>,
        start_due -> Nullable<Text>,
        end_due -> Nullable<Text>,
        start_real -> Nullable<Text>,
        end_real -> Nullable<Text>,
        pct_planned -> Nullable<Double>,
        pct_real -> Nullable<Double>,
        status -> Text,
        position -> Nullable<BigInt>,
        created_at -> Text,
    }
}
