/// Сортировка строк таблиц и индикаторы в заголовках колонок
use std::cmp::Ordering;

/// Trait для строк, поддерживающих сортировку по колонке
pub trait Sortable {
    /// Сравнивает два объекта по указанному полю
    fn compare_by_field(&self, other: &Self, field: &str) -> Ordering;
}

/// Сортирует список по указанному полю (стабильно)
pub fn sort_list<T: Sortable>(items: &mut [T], field: &str, ascending: bool) {
    items.sort_by(|a, b| {
        let cmp = a.compare_by_field(b, field);
        if ascending {
            cmp
        } else {
            cmp.reverse()
        }
    });
}

/// Case-insensitive string comparison
pub fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Missing values sort first
pub fn cmp_opt<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    a.cmp(b)
}

/// Получить индикатор сортировки для заголовка
pub fn get_sort_indicator(current_field: &str, field: &str, ascending: bool) -> &'static str {
    if current_field == field {
        if ascending {
            " ▲"
        } else {
            " ▼"
        }
    } else {
        " ⇅"
    }
}

/// Clicking the sorted column flips direction, another column sorts ascending
pub fn toggle_sort(current: (&str, bool), field: &str) -> bool {
    if current.0 == field {
        !current.1
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Row(&'static str, i64);

    impl Sortable for Row {
        fn compare_by_field(&self, other: &Self, field: &str) -> Ordering {
            match field {
                "name" => cmp_text(self.0, other.0),
                _ => self.1.cmp(&other.1),
            }
        }
    }

    #[test]
    fn test_sort_list() {
        let mut rows = vec![Row("b", 1), Row("A", 3), Row("c", 2)];
        sort_list(&mut rows, "name", true);
        assert_eq!(rows[0], Row("A", 3));
        sort_list(&mut rows, "id", false);
        assert_eq!(rows.iter().map(|r| r.1).collect::<Vec<_>>(), vec![3, 2, 1]);
    }

    #[test]
    fn test_indicator_and_toggle() {
        assert_eq!(get_sort_indicator("name", "name", true), " ▲");
        assert_eq!(get_sort_indicator("name", "id", true), " ⇅");
        assert!(!toggle_sort(("name", true), "name"));
        assert!(toggle_sort(("name", false), "id"));
    }
}
