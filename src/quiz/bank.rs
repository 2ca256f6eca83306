//! Static question bank for training mode.

use serde::Serialize;

use crate::inference::Disease;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub text: &'static str,
    pub options: &'static [&'static str],
    pub answer: &'static str,
    pub reason: &'static str,
}

pub fn questions(disease: Disease) -> &'static [Question] {
    match disease {
        Disease::Diabetes => DIABETES,
        Disease::BloodPressure => BLOOD_PRESSURE,
        Disease::LungCancer => LUNG_CANCER,
    }
}

const DIABETES: &[Question] = &[
    Question {
        text: "A 55-year-old patient with HbA1c of 8.2% is most likely to have?",
        options: &["Normal", "Prediabetes", "Diabetes"],
        answer: "Diabetes",
        reason: "HbA1c ≥ 6.5% indicates Diabetes.",
    },
    Question {
        text: "Which of the following is a common medicine for diabetes?",
        options: &["Metformin", "Aspirin", "Paracetamol"],
        answer: "Metformin",
        reason: "Metformin is the first-line drug for type 2 diabetes.",
    },
    Question {
        text: "High blood glucose levels mainly affect which organ first?",
        options: &["Kidney", "Liver", "Skin"],
        answer: "Kidney",
        reason: "Diabetes damages small blood vessels in the kidney (diabetic nephropathy).",
    },
    Question {
        text: "Which lifestyle change helps most in diabetes prevention?",
        options: &["Exercise & Diet", "Smoking", "Skipping Breakfast"],
        answer: "Exercise & Diet",
        reason: "Healthy diet + regular physical activity help prevent diabetes.",
    },
    Question {
        text: "A patient with HbA1c 5.5% is considered?",
        options: &["Normal", "Prediabetes", "Diabetes"],
        answer: "Normal",
        reason: "Normal HbA1c is below 5.7%.",
    },
    Question {
        text: "Excessive urination and thirst are symptoms of?",
        options: &["Diabetes", "Asthma", "Cancer"],
        answer: "Diabetes",
        reason: "Polyuria & polydipsia are classic diabetes symptoms.",
    },
    Question {
        text: "Which hormone is deficient in diabetes?",
        options: &["Insulin", "Thyroxine", "Adrenaline"],
        answer: "Insulin",
        reason: "Diabetes occurs due to lack of insulin or insulin resistance.",
    },
    Question {
        text: "Which test is best to monitor long-term diabetes?",
        options: &["HbA1c", "BP Test", "X-ray"],
        answer: "HbA1c",
        reason: "HbA1c reflects average glucose over the last 3 months.",
    },
    Question {
        text: "Gestational diabetes occurs during?",
        options: &["Pregnancy", "Old age", "Childhood"],
        answer: "Pregnancy",
        reason: "Gestational diabetes develops during pregnancy.",
    },
    Question {
        text: "Which complication is common in uncontrolled diabetes?",
        options: &["Kidney failure", "Hair fall", "Fracture"],
        answer: "Kidney failure",
        reason: "Diabetes damages kidneys leading to chronic kidney disease.",
    },
];

const BLOOD_PRESSURE: &[Question] = &[
    Question {
        text: "Normal BP value is?",
        options: &["120/80 mmHg", "200/100 mmHg", "90/40 mmHg"],
        answer: "120/80 mmHg",
        reason: "120/80 mmHg is considered the normal blood pressure.",
    },
    Question {
        text: "Hypertension is when systolic BP is above?",
        options: &["140 mmHg", "100 mmHg", "80 mmHg"],
        answer: "140 mmHg",
        reason: "Systolic BP ≥ 140 mmHg is considered high blood pressure.",
    },
    Question {
        text: "Which medicine is commonly prescribed for hypertension?",
        options: &["Amlodipine", "Paracetamol", "Metformin"],
        answer: "Amlodipine",
        reason: "Amlodipine is a calcium channel blocker used for hypertension.",
    },
    Question {
        text: "A patient with frequent headaches and BP 160/100 likely has?",
        options: &["Hypertension", "Hypotension", "Diabetes"],
        answer: "Hypertension",
        reason: "BP above 140/90 is classified as Hypertension.",
    },
    Question {
        text: "Low BP is called?",
        options: &["Hypotension", "Hypertension", "Stroke"],
        answer: "Hypotension",
        reason: "Hypotension refers to blood pressure lower than normal (usually <90/60).",
    },
    Question {
        text: "Which organ is MOST affected by long-term high BP?",
        options: &["Heart", "Skin", "Stomach"],
        answer: "Heart",
        reason: "Hypertension causes heart enlargement and risk of failure.",
    },
    Question {
        text: "Lifestyle change that lowers BP?",
        options: &["Less Salt", "More Junk Food", "No Exercise"],
        answer: "Less Salt",
        reason: "Reducing salt intake helps lower high blood pressure.",
    },
    Question {
        text: "Which condition increases BP risk?",
        options: &["Obesity", "Regular Yoga", "Low Stress"],
        answer: "Obesity",
        reason: "Excess weight puts more strain on the heart and blood vessels.",
    },
    Question {
        text: "Which test is used to measure BP?",
        options: &["Sphygmomanometer", "X-ray", "MRI"],
        answer: "Sphygmomanometer",
        reason: "Blood pressure is measured using a sphygmomanometer.",
    },
    Question {
        text: "Dizziness, fainting may occur due to?",
        options: &["Low BP", "High BP", "Diabetes"],
        answer: "Low BP",
        reason: "Hypotension causes inadequate blood flow → dizziness/fainting.",
    },
];

const LUNG_CANCER: &[Question] = &[
    Question {
        text: "Main risk factor for lung cancer?",
        options: &["Smoking", "Sugar", "Exercise"],
        answer: "Smoking",
        reason: "90% of lung cancer cases are linked to smoking.",
    },
    Question {
        text: "Persistent cough with blood is a sign of?",
        options: &["Lung Cancer", "Diabetes", "Hypertension"],
        answer: "Lung Cancer",
        reason: "Coughing blood is a common lung cancer symptom.",
    },
    Question {
        text: "Which scan helps in detecting lung cancer?",
        options: &["CT Scan", "Blood Sugar Test", "Urine Test"],
        answer: "CT Scan",
        reason: "CT scans help detect tumors in lungs.",
    },
    Question {
        text: "A medicine commonly used in chemotherapy?",
        options: &["Cisplatin", "Paracetamol", "Metformin"],
        answer: "Cisplatin",
        reason: "Cisplatin is a chemotherapy drug for lung cancer.",
    },
    Question {
        text: "Which group has highest lung cancer risk?",
        options: &["Smokers", "Children", "Vegetarians"],
        answer: "Smokers",
        reason: "Smokers are at highest risk of lung cancer.",
    },
    Question {
        text: "Shortness of breath and chest pain can be?",
        options: &["Lung Cancer", "Diabetes", "Kidney Failure"],
        answer: "Lung Cancer",
        reason: "Lung tumors cause breathing difficulty and chest pain.",
    },
    Question {
        text: "Secondhand smoke increases?",
        options: &["Lung Cancer Risk", "Height", "Weight"],
        answer: "Lung Cancer Risk",
        reason: "Secondhand smoke also damages lungs and raises cancer risk.",
    },
    Question {
        text: "Which organ does lung cancer start in?",
        options: &["Lungs", "Kidneys", "Liver"],
        answer: "Lungs",
        reason: "Lung cancer starts in the lung tissues.",
    },
    Question {
        text: "Chronic cough for more than 3 weeks should be?",
        options: &["Checked for Lung Cancer", "Ignored", "Self-treated"],
        answer: "Checked for Lung Cancer",
        reason: "Persistent cough must be checked for lung cancer.",
    },
    Question {
        text: "Best prevention for lung cancer?",
        options: &["Quit Smoking", "Eat More Sugar", "Skip Exercise"],
        answer: "Quit Smoking",
        reason: "The best way to prevent lung cancer is to avoid smoking.",
    },
];
