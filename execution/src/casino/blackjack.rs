//! Card duel against the house dealer.
//!
//! Stages: `Dealt -> PlayerActing (Hit*) -> Busted | DealerActing (Stand) -> Resolved`.
//! A natural on the deal resolves immediately and the dealer does not play.
//!
//! Resolution precedence:
//! 1. Natural: 5/2 of the stake
//! 2. Dealer bust or higher player total: 2x
//! 3. Equal totals: stake returned
//! 4. Otherwise the stake is forfeit

use super::{scale, GameError, GameRng};
use arcade_types::{
    casino::{
        Card, DuelSnapshot, DuelStage, Verdict, DEALER_STANDS_ON, DUEL_WIN_MULTIPLIER,
        LUCK_RESCUE_PERCENT, LUCK_SCALE_PERCENT, NATURAL_DENOMINATOR, NATURAL_NUMERATOR,
    },
    Amount,
};
use uuid::Uuid;

const BUST_THRESHOLD: u8 = 21;

/// Calculate the value of a hand.
/// Returns (value, is_soft) where is_soft means an ace is still counted as 11.
pub fn hand_value(cards: &[Card]) -> (u8, bool) {
    let mut value: u16 = 0;
    let mut aces: u8 = 0;

    for card in cards {
        if card.is_ace() {
            aces += 1;
        }
        value += card.points() as u16;
    }

    while value > BUST_THRESHOLD as u16 && aces > 0 {
        value -= 10;
        aces -= 1;
    }

    (value.min(u8::MAX as u16) as u8, aces > 0)
}

/// Two-card 21.
pub fn is_natural(cards: &[Card]) -> bool {
    cards.len() == 2 && hand_value(cards).0 == BUST_THRESHOLD
}

/// Compare final hands.
pub fn settle(player: &[Card], dealer: &[Card]) -> Verdict {
    let (player_total, _) = hand_value(player);
    let (dealer_total, _) = hand_value(dealer);
    if is_natural(player) {
        Verdict::Natural
    } else if player_total > BUST_THRESHOLD {
        Verdict::Bust
    } else if dealer_total > BUST_THRESHOLD || player_total > dealer_total {
        Verdict::Win
    } else if player_total == dealer_total {
        Verdict::Push
    } else {
        Verdict::Loss
    }
}

/// Gross payout for a verdict without buffs.
pub fn base_payout(verdict: Verdict, stake: Amount) -> Amount {
    match verdict {
        Verdict::Natural => scale(stake, NATURAL_NUMERATOR, NATURAL_DENOMINATOR),
        Verdict::Win => stake.saturating_mul(DUEL_WIN_MULTIPLIER),
        Verdict::Push => stake,
        Verdict::Loss | Verdict::Bust => 0,
    }
}

/// Apply the dealer-luck buff. Returns the payout and whether the buff changed it.
///
/// Wins are scaled to 70%. A plain loss has a 35% chance of becoming a win
/// paid at 70% of 2x. Busts and pushes are not affected.
pub fn apply_luck(
    verdict: Verdict,
    payout: Amount,
    stake: Amount,
    rng: &mut GameRng,
) -> (Amount, bool) {
    match verdict {
        Verdict::Natural | Verdict::Win => (scale(payout, LUCK_SCALE_PERCENT, 100), true),
        Verdict::Loss if rng.chance_percent(LUCK_RESCUE_PERCENT) => (
            scale(
                stake.saturating_mul(DUEL_WIN_MULTIPLIER),
                LUCK_SCALE_PERCENT,
                100,
            ),
            true,
        ),
        _ => (payout, false),
    }
}

/// One hand in progress.
pub struct Duel {
    stake: Amount,
    stage: DuelStage,
    player: Vec<Card>,
    dealer: Vec<Card>,
    deck: Vec<Card>,
    rng: GameRng,
}

fn draw(deck: &mut Vec<Card>) -> Result<Card, GameError> {
    deck.pop().ok_or(GameError::DeckExhausted)
}

impl Duel {
    /// Shuffle a fresh deck and deal two cards each, player first.
    pub fn deal(stake: Amount, mut rng: GameRng) -> Result<Self, GameError> {
        let deck = rng.create_deck();
        Self::from_deck(stake, deck, rng)
    }

    /// Deal from a prepared deck; cards are drawn from the end.
    pub fn from_deck(stake: Amount, mut deck: Vec<Card>, rng: GameRng) -> Result<Self, GameError> {
        let player = vec![draw(&mut deck)?, draw(&mut deck)?];
        let dealer = vec![draw(&mut deck)?, draw(&mut deck)?];
        let mut duel = Self {
            stake,
            stage: DuelStage::Dealt,
            player,
            dealer,
            deck,
            rng,
        };
        duel.stage = if is_natural(&duel.player) {
            DuelStage::Resolved
        } else {
            DuelStage::PlayerActing
        };
        Ok(duel)
    }

    pub fn stake(&self) -> Amount {
        self.stake
    }

    pub fn stage(&self) -> DuelStage {
        self.stage
    }

    pub fn rng(&mut self) -> &mut GameRng {
        &mut self.rng
    }

    /// Draw a card for the player. Busting ends the hand.
    pub fn hit(&mut self) -> Result<DuelStage, GameError> {
        if self.stage != DuelStage::PlayerActing {
            return Err(GameError::GameAlreadyComplete);
        }
        let card = draw(&mut self.deck)?;
        self.player.push(card);
        if hand_value(&self.player).0 > BUST_THRESHOLD {
            self.stage = DuelStage::Busted;
        }
        Ok(self.stage)
    }

    /// End the player's turn and let the dealer play out.
    pub fn stand(&mut self) -> Result<DuelStage, GameError> {
        if self.stage != DuelStage::PlayerActing {
            return Err(GameError::GameAlreadyComplete);
        }
        self.stage = DuelStage::DealerActing;
        while hand_value(&self.dealer).0 < DEALER_STANDS_ON {
            let card = draw(&mut self.deck)?;
            self.dealer.push(card);
        }
        self.stage = DuelStage::Resolved;
        Ok(self.stage)
    }

    /// Final verdict, once the hand is over.
    pub fn verdict(&self) -> Option<Verdict> {
        match self.stage {
            DuelStage::Busted => Some(Verdict::Bust),
            DuelStage::Resolved => Some(settle(&self.player, &self.dealer)),
            _ => None,
        }
    }

    /// Table view; the hole card stays hidden while the player is acting.
    pub fn snapshot(&self, session: Uuid) -> DuelSnapshot {
        let hidden = matches!(self.stage, DuelStage::Dealt | DuelStage::PlayerActing);
        let dealer: Vec<Card> = if hidden {
            self.dealer.iter().take(1).copied().collect()
        } else {
            self.dealer.clone()
        };
        DuelSnapshot {
            session,
            stake: self.stake,
            stage: self.stage,
            player_total: hand_value(&self.player).0,
            player: self.player.clone(),
            dealer_total: hand_value(&dealer).0,
            dealer,
            dealer_hidden: hidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(rank: u8) -> Card {
        Card::from_parts(rank, 0).unwrap()
    }

    /// Deck that deals `draws` in order.
    fn stacked(draws: &[u8]) -> Vec<Card> {
        draws.iter().rev().map(|&rank| card(rank)).collect()
    }

    #[test]
    fn test_hand_value_soft_aces() {
        assert_eq!(hand_value(&[card(0), card(0), card(8)]), (21, true));
        assert_eq!(hand_value(&[card(0), card(12)]), (21, true));
        assert_eq!(hand_value(&[card(0), card(5), card(9)]), (17, false));
        assert_eq!(hand_value(&[card(12), card(11), card(1)]), (22, false));
    }

    #[test]
    fn test_natural_pays_five_halves_and_skips_dealer() {
        // Player: A, K. Dealer: 5, 6.
        let deck = stacked(&[0, 12, 4, 5, 9, 9]);
        let duel = Duel::from_deck(100, deck, GameRng::seeded(0)).unwrap();
        assert_eq!(duel.stage(), DuelStage::Resolved);
        assert_eq!(duel.verdict(), Some(Verdict::Natural));
        assert_eq!(base_payout(Verdict::Natural, 100), 250);
        // Dealer never drew.
        assert_eq!(duel.snapshot(Uuid::nil()).dealer.len(), 2);
    }

    #[test]
    fn test_bust_on_hit() {
        // Player: 10, 6. Dealer: 9, 8. Hit: K.
        let deck = stacked(&[9, 5, 8, 7, 12]);
        let mut duel = Duel::from_deck(50, deck, GameRng::seeded(0)).unwrap();
        assert_eq!(duel.stage(), DuelStage::PlayerActing);
        assert!(duel.snapshot(Uuid::nil()).dealer_hidden);
        assert_eq!(duel.hit().unwrap(), DuelStage::Busted);
        assert_eq!(duel.verdict(), Some(Verdict::Bust));
        assert_eq!(duel.hit(), Err(GameError::GameAlreadyComplete));
    }

    #[test]
    fn test_dealer_draws_below_seventeen() {
        // Player: 10, 9. Dealer: 6, 5 then draws 4 (15), 3 (18).
        let deck = stacked(&[9, 8, 5, 4, 3, 2]);
        let mut duel = Duel::from_deck(100, deck, GameRng::seeded(0)).unwrap();
        duel.stand().unwrap();
        let table = duel.snapshot(Uuid::nil());
        assert!(!table.dealer_hidden);
        assert_eq!(table.dealer.len(), 4);
        assert_eq!(table.dealer_total, 18);
        assert_eq!(duel.verdict(), Some(Verdict::Win));
    }

    #[test]
    fn test_settle_precedence() {
        let twenty = [card(9), card(9)];
        let nineteen = [card(9), card(8)];
        let dealer_bust = [card(9), card(5), card(9)];
        assert_eq!(settle(&twenty, &nineteen), Verdict::Win);
        assert_eq!(settle(&nineteen, &twenty), Verdict::Loss);
        assert_eq!(settle(&twenty, &twenty), Verdict::Push);
        assert_eq!(settle(&nineteen, &dealer_bust), Verdict::Win);
        assert_eq!(base_payout(Verdict::Push, 40), 40);
        assert_eq!(base_payout(Verdict::Win, 40), 80);
    }

    #[test]
    fn test_luck_scales_wins_and_rescues_some_losses() {
        let mut rng = GameRng::seeded(21);
        assert_eq!(apply_luck(Verdict::Win, 200, 100, &mut rng), (140, true));
        assert_eq!(apply_luck(Verdict::Natural, 250, 100, &mut rng), (175, true));
        assert_eq!(apply_luck(Verdict::Push, 100, 100, &mut rng), (100, false));
        assert_eq!(apply_luck(Verdict::Bust, 0, 100, &mut rng), (0, false));

        let mut rescued = 0;
        for _ in 0..2_000 {
            match apply_luck(Verdict::Loss, 0, 100, &mut rng) {
                (140, true) => rescued += 1,
                (0, false) => {}
                other => panic!("unexpected luck outcome {other:?}"),
            }
        }
        // 35% of 2000 = 700; allow generous slack.
        assert!((550..=850).contains(&rescued), "rescued {rescued}");
    }
}
