//! tests/layout_tests.rs
//! Pruebas del layout de la carteirinha (validación y ajuste).

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::config::card_layout::{
        adjust, effective_configuration, effective_configuration_for, is_within_bounds,
        LayoutConfiguration, LayoutError, PageSize, PhotoField, TextField, BASE_LAYOUT,
        CARD_HEIGHT_PT, CARD_WIDTH_PT, DEFAULT_MARGIN,
    };

    const EPS: f64 = 1e-9;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    fn with_all_text_at(x: f64, y: f64) -> LayoutConfiguration {
        let mut c = BASE_LAYOUT;
        for f in [
            &mut c.fields.name,
            &mut c.fields.birth_date,
            &mut c.fields.team,
            &mut c.fields.validity_year,
            &mut c.fields.city,
            &mut c.fields.registration_number,
        ] {
            f.x = x;
            f.y = y;
        }
        c
    }

    #[test]
    fn default_layout_is_within_bounds() {
        assert!(is_within_bounds(&BASE_LAYOUT));
        assert_eq!(BASE_LAYOUT.page_size.width, 243.78);
        assert_eq!(BASE_LAYOUT.page_size.height, 153.07);
        assert_eq!(BASE_LAYOUT.fields.name.x, 15.0);
        assert_eq!(BASE_LAYOUT.fields.name.y, 80.0);
        assert_eq!(
            BASE_LAYOUT.fields.photo,
            PhotoField {
                x: 176.0,
                y: 67.5,
                width: 53.0,
                height: 70.0
            }
        );
    }

    #[test]
    fn effective_configuration_keeps_valid_base() {
        assert_eq!(effective_configuration(), BASE_LAYOUT);
    }

    #[test]
    fn effective_configuration_adjusts_out_of_bounds_base() {
        let mut base = BASE_LAYOUT;
        base.fields.city.x = -5.0;

        let effective = effective_configuration_for(&base);
        assert!(is_within_bounds(&effective));
        assert_eq!(effective.fields.city.x, DEFAULT_MARGIN);
        // Los campos válidos también pasan por el clamp con margen
        assert_eq!(effective.fields.team.x, DEFAULT_MARGIN);
        assert_eq!(effective.fields.name.y, 80.0);
    }

    #[test]
    fn text_anchor_is_the_only_checked_point() {
        let mut c = BASE_LAYOUT;
        // Anclaje en el borde exacto: válido aunque el texto se salga
        c.fields.registration_number.x = CARD_WIDTH_PT;
        c.fields.registration_number.max_width = 500.0;
        assert!(is_within_bounds(&c));

        c.fields.registration_number.x = CARD_WIDTH_PT + 0.01;
        assert!(!is_within_bounds(&c));
    }

    #[test]
    fn photo_far_corner_is_checked() {
        let mut c = BASE_LAYOUT;
        c.fields.photo.x = 200.0; // 200 + 53 > 243.78
        assert!(!is_within_bounds(&c));

        c.fields.photo.x = 190.0;
        assert!(is_within_bounds(&c));
    }

    #[test]
    fn negative_coordinates_are_out_of_bounds() {
        let mut c = BASE_LAYOUT;
        c.fields.birth_date.y = -0.5;
        assert!(!is_within_bounds(&c));
    }

    #[test]
    fn clamps_negative_x_to_margin() {
        let mut c = BASE_LAYOUT;
        c.fields.name.x = -10.0;
        c.fields.photo.x = -10.0;

        let adjusted = adjust(&c, 20.0);
        assert_eq!(adjusted.fields.name.x, 20.0);
        assert_eq!(adjusted.fields.photo.x, 20.0);
    }

    #[test]
    fn clamps_large_x_to_upper_bound() {
        let mut c = BASE_LAYOUT;
        c.fields.city.x = CARD_WIDTH_PT + 50.0;
        c.fields.photo.x = CARD_WIDTH_PT + 50.0;

        let adjusted = adjust(&c, 20.0);
        assert!(approx(adjusted.fields.city.x, CARD_WIDTH_PT - 20.0));
        assert!(approx(adjusted.fields.photo.x, CARD_WIDTH_PT - 53.0 - 20.0));
    }

    #[test]
    fn photo_out_of_page_scenario() {
        let mut c = BASE_LAYOUT;
        c.fields.photo = PhotoField {
            x: 300.0,
            y: 200.0,
            width: 53.0,
            height: 70.0,
        };

        let adjusted = adjust(&c, 20.0);
        assert!(approx(adjusted.fields.photo.x, 170.78));
        assert!(approx(adjusted.fields.photo.y, 63.07));
        assert_eq!(adjusted.fields.photo.width, 53.0);
        assert_eq!(adjusted.fields.photo.height, 70.0);
    }

    #[test]
    fn all_text_fields_at_origin_move_to_margin() {
        let adjusted = adjust(&with_all_text_at(0.0, 0.0), 20.0);
        for (key, f) in adjusted.fields.text_fields() {
            assert_eq!((f.x, f.y), (20.0, 20.0), "campo {}", key);
        }
    }

    #[test]
    fn sizes_pass_through_unchanged() {
        let mut c = with_all_text_at(-100.0, 900.0);
        c.fields.team.font_size = 11.0;
        c.fields.team.max_width = 77.0;

        let adjusted = adjust(&c, 20.0);
        assert_eq!(adjusted.fields.team.font_size, 11.0);
        assert_eq!(adjusted.fields.team.max_width, 77.0);
        assert_eq!(adjusted.page_size, c.page_size);
    }

    #[test]
    fn adjust_does_not_mutate_input() {
        let original = with_all_text_at(-3.0, 500.0);
        let copy = original;
        let _ = adjust(&original, 20.0);
        assert_eq!(original, copy);
    }

    #[test]
    fn degenerate_page_favors_lower_bound() {
        let mut c = with_all_text_at(10.0, 10.0);
        c.page_size = PageSize {
            width: 30.0,
            height: 30.0,
        };
        // Intervalo [20, 10] invertido: el resultado es el margen
        let adjusted = adjust(&c, 20.0);
        assert_eq!(adjusted.fields.name.x, 20.0);
        assert_eq!(adjusted.fields.name.y, 20.0);
        assert_eq!(adjusted.fields.photo.x, 20.0);
        assert_eq!(adjusted.fields.photo.y, 20.0);
    }

    #[test]
    fn json_shape_uses_public_field_names() {
        let json = serde_json::to_value(BASE_LAYOUT).unwrap();
        assert_eq!(json["fields"]["name"]["fontSize"], 8.0);
        assert_eq!(json["fields"]["birthDate"]["maxWidth"], 100.0);
        assert_eq!(json["fields"]["registrationNumber"]["x"], 160.0);
        assert_eq!(json["fields"]["validityYear"]["x"], 122.0);
        assert_eq!(json["fields"]["photo"]["height"], 70.0);
        assert_eq!(json["pageSize"]["width"], 243.78);
    }

    #[test]
    fn from_json_accepts_serialized_layout() {
        let raw = serde_json::to_string(&BASE_LAYOUT).unwrap();
        assert_eq!(LayoutConfiguration::from_json(&raw).unwrap(), BASE_LAYOUT);
    }

    #[test]
    fn from_json_rejects_unknown_field() {
        let mut json = serde_json::to_value(BASE_LAYOUT).unwrap();
        json["fields"]["nickname"] = json["fields"]["name"].clone();

        let err = LayoutConfiguration::from_json(&json.to_string()).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidConfiguration(_)));
    }

    #[test]
    fn from_json_rejects_missing_field() {
        let mut json = serde_json::to_value(BASE_LAYOUT).unwrap();
        json["fields"].as_object_mut().unwrap().remove("city");

        assert!(LayoutConfiguration::from_json(&json.to_string()).is_err());
    }

    #[test]
    fn from_json_rejects_non_numeric_coordinate() {
        let mut json = serde_json::to_value(BASE_LAYOUT).unwrap();
        json["fields"]["team"]["x"] = serde_json::json!("15");

        assert!(LayoutConfiguration::from_json(&json.to_string()).is_err());
    }

    #[test]
    fn validate_rejects_nan_and_bad_sizes() {
        let mut c = BASE_LAYOUT;
        c.fields.name.x = f64::NAN;
        assert!(c.validate().is_err());

        let mut c = BASE_LAYOUT;
        c.fields.photo.width = -1.0;
        assert!(c.validate().is_err());

        let mut c = BASE_LAYOUT;
        c.page_size.height = 0.0;
        assert!(c.validate().is_err());

        assert!(BASE_LAYOUT.validate().is_ok());
    }

    fn coord() -> impl Strategy<Value = f64> {
        -1000.0f64..1000.0
    }

    prop_compose! {
        fn arb_text()(x in coord(), y in coord()) -> TextField {
            TextField { x, y, font_size: 8.0, max_width: 100.0 }
        }
    }

    prop_compose! {
        fn arb_layout()(
            texts in proptest::collection::vec(arb_text(), 6),
            px in coord(),
            py in coord(),
            pw in 1.0f64..80.0,
            ph in 1.0f64..80.0,
        ) -> LayoutConfiguration {
            let mut c = BASE_LAYOUT;
            c.fields.name = texts[0];
            c.fields.birth_date = texts[1];
            c.fields.team = texts[2];
            c.fields.validity_year = texts[3];
            c.fields.city = texts[4];
            c.fields.registration_number = texts[5];
            c.fields.photo = PhotoField { x: px, y: py, width: pw, height: ph };
            c
        }
    }

    proptest! {
        #[test]
        fn adjust_is_idempotent(c in arb_layout(), margin in 0.0f64..30.0) {
            let once = adjust(&c, margin);
            prop_assert_eq!(adjust(&once, margin), once);
        }

        #[test]
        fn adjusted_layout_is_within_bounds(c in arb_layout(), margin in 0.0f64..30.0) {
            let page = c.page_size;
            let photo = c.fields.photo;
            // El postcondicional exige que la foto quepa en la página con margen
            prop_assume!(page.width - photo.width - margin >= margin);
            prop_assume!(page.height - photo.height - margin >= margin);
            prop_assert!(is_within_bounds(&adjust(&c, margin)));
        }

        #[test]
        fn adjust_never_mutates(c in arb_layout()) {
            let before = c;
            let _ = adjust(&c, DEFAULT_MARGIN);
            prop_assert_eq!(c, before);
        }
    }

    #[test]
    fn page_constants_match_millimetres() {
        let pt_per_mm = 72.0 / 25.4;
        assert!((CARD_WIDTH_PT - 86.0 * pt_per_mm).abs() < 0.01);
        assert!((CARD_HEIGHT_PT - 54.0 * pt_per_mm).abs() < 0.01);
    }
}
