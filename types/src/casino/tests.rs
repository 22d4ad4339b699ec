use super::*;
use crate::AccountId;

#[test]
fn test_wager_parsing() {
    assert_eq!("a".parse::<Wager>().unwrap(), Wager::All);
    assert_eq!("ALL".parse::<Wager>().unwrap(), Wager::All);
    assert_eq!("250".parse::<Wager>().unwrap(), Wager::Amount(250));
    assert_eq!(" 99.9 ".parse::<Wager>().unwrap(), Wager::Amount(99));
    assert!("-5".parse::<Wager>().is_err());
    assert!("ten".parse::<Wager>().is_err());
    assert!("NaN".parse::<Wager>().is_err());
}

#[test]
fn test_wheel_bet_parsing() {
    assert_eq!(
        "Red".parse::<WheelBet>().unwrap(),
        WheelBet::Color(Color::Red)
    );
    assert_eq!("0".parse::<WheelBet>().unwrap(), WheelBet::Number(0));
    assert_eq!("36".parse::<WheelBet>().unwrap(), WheelBet::Number(36));
    assert!("37".parse::<WheelBet>().is_err());
    assert!("purple".parse::<WheelBet>().is_err());
}

#[test]
fn test_wheel_colors() {
    assert_eq!(Color::of(0), Color::Green);
    assert_eq!(Color::of(7), Color::Red);
    assert_eq!(Color::of(36), Color::Black);
}

#[test]
fn test_multiplier_parsing() {
    assert_eq!(
        "2.5x".parse::<Multiplier>().unwrap(),
        Multiplier::from_hundredths(250)
    );
    assert_eq!(
        "3".parse::<Multiplier>().unwrap(),
        Multiplier::from_hundredths(300)
    );
    assert_eq!(
        "1.019".parse::<Multiplier>().unwrap(),
        Multiplier::from_hundredths(101)
    );
    assert!("-2".parse::<Multiplier>().is_err());
    assert_eq!(Multiplier::from_hundredths(150).to_string(), "1.50x");
    assert_eq!(Multiplier::from_hundredths(150).apply(100), 150);
    assert_eq!(Multiplier::from_hundredths(333).apply(10), 33);
}

#[test]
fn test_box_tables() {
    for tier in BoxTier::ALL {
        let total: u32 = tier.rewards().iter().map(|r| r.weight).sum();
        assert_eq!(total, 100, "{tier} weights");
    }
    assert_eq!("rara".parse::<BoxTier>().unwrap(), BoxTier::Rare);
    assert_eq!(BoxTier::Crazy.price(), 100_000);
}

#[test]
fn test_buff_keys_round_trip() {
    for kind in BuffKind::ALL {
        assert_eq!(BuffKind::from_key(kind.key()), Some(kind));
    }
    assert_eq!(BuffKind::from_key("unknown"), None);
}

#[test]
fn test_leaderboard_update() {
    let mut leaderboard = Leaderboard::default();

    for i in 0..15u64 {
        leaderboard.update(AccountId::new(format!("player{i}")), (i + 1) * 1000);
    }

    // Should only keep top 10
    assert_eq!(leaderboard.entries.len(), 10);

    // Should be sorted by balance descending
    for i in 0..9 {
        assert!(leaderboard.entries[i].balance >= leaderboard.entries[i + 1].balance);
    }
    assert_eq!(leaderboard.entries[0].account, AccountId::from("player14"));

    // Ranks should be 1-10
    for (i, entry) in leaderboard.entries.iter().enumerate() {
        assert_eq!(entry.rank, (i + 1) as u32);
    }

    // Re-ranking an existing account replaces its entry
    leaderboard.update(AccountId::from("player5"), 1_000_000);
    assert_eq!(leaderboard.entries[0].account, AccountId::from("player5"));
    assert_eq!(leaderboard.entries.len(), 10);
}
