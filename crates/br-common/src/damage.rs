//! 데미지 계산 엔진 (pure, no I/O).
//!
//! 배달건수 → 보스 데미지 변환 규칙. 입력이 같으면 결과가 항상 같아야
//! 동기화 재실행이 멱등해진다 (원장 upsert 전제).

/// 배달 1건당 기본 데미지.
pub const BASE_DAMAGE_PER_DELIVERY: i64 = 10;

/// 우천 또는 할증 시 보너스 배율. 둘 다 해당해도 2배 (중첩 없음).
pub const WEATHER_BONUS_MULTIPLIER: f64 = 2.0;

/// Result of scoring one delivery log against a raid.
///
/// `bonus_multiplier` is the effective multiplier (weather bonus × raid
/// buff), which is what the damage ledger stores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageBreakdown {
    pub base_damage: i64,
    pub bonus_multiplier: f64,
    pub total_damage: i64,
}

/// Compute the damage one delivery log deals.
///
/// Deterministic and total: never errors, and `total_damage` is a
/// non-negative integer for every `delivery_count >= 0` and
/// `buff_multiplier >= 1.0`. Input validation is the ingestor's job.
pub fn compute_damage(
    delivery_count: i32,
    is_rainy: bool,
    has_surge: bool,
    buff_multiplier: f64,
) -> DamageBreakdown {
    let base_damage = i64::from(delivery_count.max(0)) * BASE_DAMAGE_PER_DELIVERY;

    let weather_bonus = if is_rainy || has_surge {
        WEATHER_BONUS_MULTIPLIER
    } else {
        1.0
    };
    let bonus_multiplier = weather_bonus * buff_multiplier;

    let total_damage = (base_damage as f64 * bonus_multiplier).floor() as i64;

    DamageBreakdown {
        base_damage,
        bonus_multiplier,
        total_damage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_from_gangnam_raid() {
        // 5건 배달, 우천, 버프 1.5배 → base 50, 배율 3.0, 총 150.
        let breakdown = compute_damage(5, true, false, 1.5);
        assert_eq!(breakdown.base_damage, 50);
        assert_eq!(breakdown.bonus_multiplier, 3.0);
        assert_eq!(breakdown.total_damage, 150);
    }

    #[test]
    fn rain_and_surge_do_not_stack() {
        for count in [0, 1, 7, 123] {
            let rainy = compute_damage(count, true, false, 1.0);
            let surge = compute_damage(count, false, true, 1.0);
            let both = compute_damage(count, true, true, 1.0);
            assert_eq!(rainy.total_damage, surge.total_damage);
            assert_eq!(surge.total_damage, both.total_damage);
        }
    }

    #[test]
    fn monotonically_non_decreasing_in_count() {
        for buff in [1.0, 1.25, 2.0] {
            let mut previous = -1;
            for count in 0..100 {
                let total = compute_damage(count, false, true, buff).total_damage;
                assert!(total >= previous, "count {count} buff {buff}");
                previous = total;
            }
        }
    }

    #[test]
    fn no_conditions_means_base_only() {
        let breakdown = compute_damage(8, false, false, 1.0);
        assert_eq!(breakdown.base_damage, 80);
        assert_eq!(breakdown.bonus_multiplier, 1.0);
        assert_eq!(breakdown.total_damage, 80);
    }

    #[test]
    fn fractional_buff_floors_total() {
        // 3건 × 10 = 30, 배율 1.1 → 33.0; 배율 1.15 → 34.5 → 34.
        assert_eq!(compute_damage(3, false, false, 1.1).total_damage, 33);
        assert_eq!(compute_damage(3, false, false, 1.15).total_damage, 34);
    }

    #[test]
    fn zero_count_deals_zero() {
        let breakdown = compute_damage(0, true, true, 3.0);
        assert_eq!(breakdown.base_damage, 0);
        assert_eq!(breakdown.total_damage, 0);
    }
}
