// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Free-text category labels to canonical [`Category`] values.
//!
//! Labels come from front ends in Spanish or English, with or without
//! accents. Both the lookup key and the alias table are folded the same way
//! before comparison.

use crate::models::Category;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

const ALIASES: &[(&str, Category)] = &[
    ("vivienda", Category::Housing),
    ("hogar", Category::Housing),
    ("arriendo", Category::Housing),
    ("alquiler", Category::Housing),
    ("renta", Category::Housing),
    ("hipoteca", Category::Housing),
    ("rent", Category::Housing),
    ("servicios basicos", Category::Utilities),
    ("servicios", Category::Utilities),
    ("cuentas", Category::Utilities),
    ("luz", Category::Utilities),
    ("agua", Category::Utilities),
    ("gas", Category::Utilities),
    ("internet", Category::Utilities),
    ("telefono", Category::Utilities),
    ("transporte", Category::Transport),
    ("movilidad", Category::Transport),
    ("combustible", Category::Transport),
    ("gasolina", Category::Transport),
    ("bencina", Category::Transport),
    ("transportation", Category::Transport),
    ("alimentacion", Category::Food),
    ("comida", Category::Food),
    ("supermercado", Category::Food),
    ("restaurantes", Category::Food),
    ("groceries", Category::Food),
    ("salud", Category::Health),
    ("farmacia", Category::Health),
    ("medico", Category::Health),
    ("educacion", Category::Education),
    ("colegio", Category::Education),
    ("universidad", Category::Education),
    ("cursos", Category::Education),
    ("entretenimiento", Category::Entertainment),
    ("ocio", Category::Entertainment),
    ("diversion", Category::Entertainment),
    ("cuidado personal", Category::Personal),
    ("ropa", Category::Personal),
    ("vestuario", Category::Personal),
    ("suscripciones", Category::Subscription),
    ("suscripcion", Category::Subscription),
    ("subscriptions", Category::Subscription),
    ("deudas", Category::Debt),
    ("deuda", Category::Debt),
    ("prestamos", Category::Debt),
    ("tarjeta de credito", Category::Debt),
    ("ahorro", Category::Savings),
    ("ahorros", Category::Savings),
    ("inversion", Category::Savings),
    ("otros", Category::Other),
    ("otro", Category::Other),
    ("varios", Category::Other),
    ("others", Category::Other),
];

static TABLE: Lazy<HashMap<String, Category>> = Lazy::new(|| {
    let mut table: HashMap<String, Category> = Category::ALL
        .iter()
        .map(|c| (c.as_str().to_string(), *c))
        .collect();
    for (alias, cat) in ALIASES {
        table.insert(fold(alias), *cat);
    }
    table
});

/// Decompose, drop combining marks, lowercase, trim and collapse whitespace.
pub fn fold(label: &str) -> String {
    let stripped: String = label.nfd().filter(|c| !is_combining_mark(*c)).collect();
    stripped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn resolve(label: &str) -> Option<Category> {
    let key = fold(label);
    if key.is_empty() {
        return None;
    }
    TABLE.get(&key).copied()
}
